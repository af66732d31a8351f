// Topology loaded from a layer's map source
use super::link::Link;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Topology {
    #[serde(default)]
    pub links: Vec<Link>,
}

impl Topology {
    #[cfg(test)]
    pub fn new(links: Vec<Link>) -> Self {
        Self { links }
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    pub fn links_mut(&mut self) -> &mut [Link] {
        &mut self.links
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_json() {
        let json = r#"{
            "links": [
                {"name": "CHIC-NEWY", "endpoints": ["chic.ae-1", "newy.ae-3"]},
                {"name": "NEWY-WASH", "endpoints": ["newy.ae-4", "wash.ae-2"]}
            ]
        }"#;
        let topology = Topology::from_json(json).unwrap();

        assert_eq!(topology.links().len(), 2);
        assert_eq!(topology.links()[0].endpoints[1], "newy.ae-3");
        assert_eq!(topology.links()[1].arrow, None);
    }

    #[test]
    fn test_rejects_malformed_endpoints() {
        let json = r#"{"links": [{"name": "l1", "endpoints": ["only-one"]}]}"#;
        assert!(Topology::from_json(json).is_err());
    }
}
