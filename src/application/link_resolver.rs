// Link resolution - Which links a series measures, and from which side
use crate::domain::link::{Link, Side};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkMatch {
    pub index: usize,
    pub side: Side,
}

/// Find every link with `target` as one of its endpoints (exact, case-sensitive).
pub fn resolve_links(target: &str, links: &[Link]) -> Vec<LinkMatch> {
    links
        .iter()
        .enumerate()
        .filter(|(_, link)| link.endpoints.iter().any(|ep| ep == target))
        .map(|(index, link)| LinkMatch {
            index,
            side: link.side_of(target),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn links() -> Vec<Link> {
        vec![
            Link::new("CHIC-NEWY", "chic.ae-1", "newy.ae-3"),
            Link::new("NEWY-WASH", "newy.ae-3", "wash.ae-2"),
            Link::new("WASH-ATLA", "wash.ae-5", "atla.ae-1"),
        ]
    }

    #[test]
    fn test_single_match() {
        let matches = resolve_links("chic.ae-1", &links());
        assert_eq!(matches, vec![LinkMatch { index: 0, side: Side::A }]);
    }

    #[test]
    fn test_fan_out_across_links() {
        let matches = resolve_links("newy.ae-3", &links());
        assert_eq!(
            matches,
            vec![
                LinkMatch { index: 0, side: Side::Z },
                LinkMatch { index: 1, side: Side::A },
            ]
        );
    }

    #[test]
    fn test_no_match() {
        assert!(resolve_links("denv.ae-9", &links()).is_empty());
    }

    #[test]
    fn test_match_is_exact() {
        assert!(resolve_links("CHIC.AE-1", &links()).is_empty());
        assert!(resolve_links("chic.ae-1 AZ", &links()).is_empty());
        assert!(resolve_links("chic.ae", &links()).is_empty());
    }
}
