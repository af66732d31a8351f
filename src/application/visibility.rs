// Layer visibility - Hide layers whose endpoints received no data
use super::map_widget::NetworkLayer;
use crate::domain::link::Link;
use std::collections::HashSet;

pub fn has_missing_endpoints(links: &[Link], targets: &HashSet<&str>) -> bool {
    links
        .iter()
        .flat_map(|link| link.endpoints.iter())
        .any(|ep| !targets.contains(ep.as_str()))
}

/// Show the layer only if every endpoint of every link is among this
/// event's targets. Returns the visibility that was applied, or `None` when
/// the layer has no topology yet.
pub fn apply_visibility<L: NetworkLayer>(layer: &mut L, targets: &HashSet<&str>) -> Option<bool> {
    let missing = has_missing_endpoints(layer.topology_mut()?.links(), targets);
    if missing {
        tracing::debug!("Hiding layer {} - endpoints without data", layer.layer_id());
    }
    layer.toggle(!missing);
    Some(!missing)
}
