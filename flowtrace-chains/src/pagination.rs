//! Pagination heuristic (spec.md §4.4, "Pagination detection"): steps
//! hitting the same endpoint with a strictly increasing numeric query
//! parameter are a paging loop.

use flowtrace_types::NetworkEvent;
use std::collections::{HashMap, HashSet};

const PAGINATION_KEYS: &[&str] = &["page", "offset", "skip", "start", "cursor", "after", "before", "limit"];

/// Indices (positions in `ordered_steps`) that belong to a detected
/// pagination loop.
pub fn detect_pagination(events: &[&NetworkEvent]) -> HashSet<usize> {
    let mut groups: HashMap<(String, String), Vec<usize>> = HashMap::new();
    for (i, event) in events.iter().enumerate() {
        groups
            .entry((event.method.clone(), event.host_path()))
            .or_default()
            .push(i);
    }

    let mut paginated = HashSet::new();
    for members in groups.values() {
        if members.len() < 2 {
            continue;
        }
        if group_has_pagination_sequence(events, members) {
            paginated.extend(members.iter().copied());
        }
    }
    paginated
}

fn group_has_pagination_sequence(events: &[&NetworkEvent], members: &[usize]) -> bool {
    let Some(parsed_urls): Option<Vec<url::Url>> = members
        .iter()
        .map(|&i| url::Url::parse(&events[i].url).ok())
        .collect()
    else {
        return false;
    };

    for &key in PAGINATION_KEYS {
        let values: Vec<f64> = parsed_urls
            .iter()
            .filter_map(|u| u.query_pairs().find(|(k, _)| k == key))
            .filter_map(|(_, v)| v.parse::<f64>().ok())
            .collect();
        if values.len() == members.len() && values.windows(2).all(|w| w[0] < w[1]) {
            return true;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap as StdHashMap;

    fn net(url: &str) -> NetworkEvent {
        NetworkEvent {
            timestamp: 0,
            method: "GET".to_string(),
            url: url.to_string(),
            request_headers: StdHashMap::new(),
            request_body: None,
            response_status: 200,
            response_headers: StdHashMap::new(),
            response_body: None,
        }
    }

    #[test]
    fn detects_increasing_page_parameter() {
        let e1 = net("https://api.example.com/items?page=1");
        let e2 = net("https://api.example.com/items?page=2");
        let e3 = net("https://api.example.com/items?page=3");
        let events = vec![&e1, &e2, &e3];
        let result = detect_pagination(&events);
        assert_eq!(result, [0, 1, 2].into_iter().collect());
    }

    #[test]
    fn non_increasing_sequence_is_not_pagination() {
        let e1 = net("https://api.example.com/items?page=2");
        let e2 = net("https://api.example.com/items?page=1");
        let events = vec![&e1, &e2];
        assert!(detect_pagination(&events).is_empty());
    }

    #[test]
    fn single_member_group_is_not_pagination() {
        let e1 = net("https://api.example.com/items?page=1");
        let events = vec![&e1];
        assert!(detect_pagination(&events).is_empty());
    }

    #[test]
    fn unknown_query_key_is_not_pagination() {
        let e1 = net("https://api.example.com/items?color=red");
        let e2 = net("https://api.example.com/items?color=blue");
        let events = vec![&e1, &e2];
        assert!(detect_pagination(&events).is_empty());
    }
}
