use super::*;

#[test]
fn iterates_in_insertion_order() {
    let mut m = OrderedMap::new();
    m.insert("c", 3);
    m.insert("a", 1);
    m.insert("b", 2);
    assert_eq!(m.keys().copied().collect::<Vec<_>>(), vec!["c", "a", "b"]);
}

#[test]
fn replacing_keeps_original_slot() {
    let mut m = OrderedMap::new();
    m.insert("a", 1);
    m.insert("b", 2);
    assert_eq!(m.insert("a", 10), Some(1));
    assert_eq!(
        m.iter().map(|(k, v)| (*k, *v)).collect::<Vec<_>>(),
        vec![("a", 10), ("b", 2)]
    );
}

#[test]
fn remove_then_reinsert_moves_to_back() {
    let mut m = OrderedMap::new();
    m.insert("a".to_string(), 1);
    m.insert("b".to_string(), 2);
    assert_eq!(m.remove("a"), Some(1));
    assert!(!m.contains_key("a"));
    m.insert("a".to_string(), 3);
    assert_eq!(m.values().copied().collect::<Vec<_>>(), vec![2, 3]);
    assert_eq!(m.len(), 2);
}

#[test]
fn missing_keys_are_none() {
    let mut m: OrderedMap<String, i32> = OrderedMap::new();
    assert!(m.get("x").is_none());
    assert!(m.remove("x").is_none());
    assert!(m.is_empty());
}
