use std::net::Ipv4Addr;

/// An IPv4 literal found in a line of text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Match {
    /// 1-based byte column where the literal starts.
    pub column: usize,
    pub addr: Ipv4Addr,
}

/// Find every dotted-quad IPv4 literal in `line`.
///
/// A candidate is a maximal run of digits and dots. Surrounding dots are
/// ignored, and the rest must be exactly four decimal octets, so version
/// strings like `1.2.3` and longer dotted numbers like `1.2.3.4.5` are not
/// reported.
pub fn scan_line(line: &str) -> Vec<Match> {
    let bytes = line.as_bytes();
    let mut found = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        if !is_candidate_byte(bytes[i]) {
            i += 1;
            continue;
        }
        let start = i;
        while i < bytes.len() && is_candidate_byte(bytes[i]) {
            i += 1;
        }

        let token = &line[start..i];
        let trimmed = token.trim_start_matches('.');
        let offset = token.len() - trimmed.len();
        let trimmed = trimmed.trim_end_matches('.');

        if let Some(addr) = parse_dotted_quad(trimmed) {
            found.push(Match {
                column: start + offset + 1,
                addr,
            });
        }
    }
    found
}

fn is_candidate_byte(b: u8) -> bool {
    b.is_ascii_digit() || b == b'.'
}

/// Zero-padded octets such as `010` count; they are read as decimal.
fn parse_dotted_quad(token: &str) -> Option<Ipv4Addr> {
    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 4 || parts.iter().any(|p| p.is_empty() || p.len() > 3) {
        return None;
    }
    let mut octets = [0u8; 4];
    for (octet, part) in octets.iter_mut().zip(&parts) {
        *octet = part.parse().ok()?;
    }
    Some(Ipv4Addr::from(octets))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addrs(line: &str) -> Vec<String> {
        scan_line(line).iter().map(|m| m.addr.to_string()).collect()
    }

    #[test]
    fn test_finds_literal_in_url() {
        let found = scan_line(r#"const API = "http://10.0.0.1:8080/v1";"#);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].addr, Ipv4Addr::new(10, 0, 0, 1));
        assert_eq!(found[0].column, 21);
    }

    #[test]
    fn test_multiple_on_one_line() {
        assert_eq!(
            addrs("hosts: 192.168.0.2, 172.16.5.4"),
            vec!["192.168.0.2", "172.16.5.4"]
        );
    }

    #[test]
    fn test_ignores_version_strings() {
        assert!(addrs(r#"version = "1.2.3""#).is_empty());
        assert!(addrs("node v18.17.0").is_empty());
    }

    #[test]
    fn test_ignores_five_part_numbers() {
        assert!(addrs("build 1.2.3.4.5").is_empty());
    }

    #[test]
    fn test_ignores_out_of_range_octets() {
        assert!(addrs("999.1.1.1").is_empty());
        assert!(addrs("1.2.3.256").is_empty());
    }

    #[test]
    fn test_zero_padded_octets() {
        assert_eq!(addrs("host = 10.0.0.01"), vec!["10.0.0.1"]);
        assert_eq!(addrs("gw 192.168.001.010"), vec!["192.168.1.10"]);
        assert!(addrs("0256.1.1.1").is_empty());
    }

    #[test]
    fn test_ignores_empty_octets() {
        assert!(addrs("10..0.1").is_empty());
    }

    #[test]
    fn test_sentence_punctuation() {
        let found = scan_line("Point it at 10.1.2.3.");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].addr, Ipv4Addr::new(10, 1, 2, 3));
        assert_eq!(found[0].column, 13);
    }

    #[test]
    fn test_leading_dot() {
        let found = scan_line("x.10.1.2.3");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].column, 3);
    }

    #[test]
    fn test_plain_numbers() {
        assert!(addrs("let n = 12345; let f = 3.14;").is_empty());
    }
}
