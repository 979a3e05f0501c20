//! Director administrative wire format.
//!
//! Every message is a single LF-terminated line with tab-separated fields.
//!
//! ```text
//! → VERSION\tdirector-doveadm\t1\t0
//! ← VERSION\tdirector-doveadm\t1\t0
//! → HOST-LIST
//! ← 10.0.0.5\t100\t12
//! ← 10.0.0.6\t0\t0
//! ←                                (empty line ends the list)
//! → HOST-SET\t10.0.0.6\t100
//! → HOST-FLUSH\t10.0.0.5
//! ```

/// Handshake line; the director must echo it back unchanged.
pub const VERSION_LINE: &str = "VERSION\tdirector-doveadm\t1\t0\n";

/// Requests the host table.
pub const HOST_LIST: &str = "HOST-LIST\n";

/// Terminates the `HOST-LIST` reply.
pub const END_OF_LIST: &str = "\n";

/// One host as reported by `HOST-LIST`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostRecord {
    /// Backend address as the director knows it.
    pub address: String,
    /// Current weight (vhost count); 0 means disabled.
    pub weight: u32,
    /// Clients currently assigned to the host.
    pub clients: u64,
}

impl HostRecord {
    /// Parse one `address\tweight\tclients` line.
    ///
    /// Returns `None` for anything else: wrong field count, an empty address
    /// or non-numeric counters.
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim_end_matches(['\n', '\r']);
        let mut fields = line.split('\t');

        let address = fields.next()?;
        let weight = fields.next()?;
        let clients = fields.next()?;
        if fields.next().is_some() || address.is_empty() {
            return None;
        }

        Some(Self {
            address: address.to_string(),
            weight: weight.parse().ok()?,
            clients: clients.parse().ok()?,
        })
    }

    /// Whether the director currently routes traffic to this host.
    pub fn is_enabled(&self) -> bool {
        self.weight != 0
    }
}

/// `HOST-SET` directive for `host`.
pub fn host_set(host: &str, weight: u32) -> String {
    format!("HOST-SET\t{}\t{}\n", host, weight)
}

/// `HOST-FLUSH` directive for `host`.
pub fn host_flush(host: &str) -> String {
    format!("HOST-FLUSH\t{}\n", host)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_list_record() {
        let record = HostRecord::parse("10.0.0.5\t100\t12\n").unwrap();
        assert_eq!(record.address, "10.0.0.5");
        assert_eq!(record.weight, 100);
        assert_eq!(record.clients, 12);
        assert!(record.is_enabled());

        let record = HostRecord::parse("mail1\t0\t3").unwrap();
        assert!(!record.is_enabled());
    }

    #[test]
    fn rejects_wrong_field_count() {
        assert_eq!(HostRecord::parse("mail1\n"), None);
        assert_eq!(HostRecord::parse("mail1\t100\n"), None);
        assert_eq!(HostRecord::parse("mail1\t100\t3\textra\n"), None);
    }

    #[test]
    fn rejects_non_numeric_fields() {
        assert_eq!(HostRecord::parse("mail1\tfull\t3\n"), None);
        assert_eq!(HostRecord::parse("mail1\t100\t-1\n"), None);
        assert_eq!(HostRecord::parse("\t100\t3\n"), None);
    }

    #[test]
    fn directives_are_tab_separated() {
        assert_eq!(host_set("10.0.0.6", 75), "HOST-SET\t10.0.0.6\t75\n");
        assert_eq!(host_flush("10.0.0.6"), "HOST-FLUSH\t10.0.0.6\n");
    }
}
