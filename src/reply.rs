//! Conversions between flat `[k1, v1, k2, v2]` Redis arrays and maps

use std::collections::BTreeMap;
use std::fmt::Display;

use crate::remote::Param;

/// Turn `[k1, v1, k2, v2, ...]` into `{k1: v1, k2: v2, ...}`
///
/// A trailing key without value maps to `None`. Later duplicates win.
pub fn pairs_to_map<V: Display>(data: Vec<V>) -> BTreeMap<String, Option<V>> {
    let mut map = BTreeMap::new();
    let mut items = data.into_iter();

    while let Some(key) = items.next() {
        map.insert(key.to_string(), items.next());
    }

    map
}

/// Flatten key/value pairs into command parameters (`HSET key k1 v1 k2 v2`)
pub fn map_to_pairs<I, K, V>(pairs: I) -> Vec<Param>
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<Param>,
    V: Into<Param>,
{
    pairs
        .into_iter()
        .flat_map(|(k, v)| [k.into(), v.into()])
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pairs_to_map() {
        let map = pairs_to_map(vec!["a", "1", "b", "2"]);
        assert_eq!(map.len(), 2);
        assert_eq!(map["a"], Some("1"));
        assert_eq!(map["b"], Some("2"));
    }

    #[test]
    fn test_pairs_to_map_odd_length() {
        let map = pairs_to_map(vec![1, 10, 2]);
        assert_eq!(map["1"], Some(10));
        assert_eq!(map["2"], None);
    }

    #[test]
    fn test_pairs_to_map_empty() {
        assert!(pairs_to_map(Vec::<String>::new()).is_empty());
    }

    #[test]
    fn test_map_to_pairs() {
        let params = map_to_pairs([("name", Param::from("x")), ("count", Param::from(3i64))]);
        assert_eq!(
            params,
            vec![
                Param::from("name"),
                Param::from("x"),
                Param::from("count"),
                Param::Int(3),
            ]
        );
    }
}
