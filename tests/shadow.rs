use std::collections::hash_map::DefaultHasher;
use std::collections::HashSet;
use std::hash::BuildHasherDefault;

use hopset::ShadowSet;
use rand::seq::SliceRandom;
use rand::thread_rng;
use rand::Rng;

#[test]
fn simple_insert() {
    let mut table = ShadowSet::new();
    assert_eq!(table.len(), 0);
    for i in 0..10i32 {
        let (_, inserted) = table.insert(i).unwrap();
        assert!(inserted);
        assert_eq!(table.len(), (i + 1) as usize);
    }
}

#[test]
fn insert_copy() {
    let mut table = ShadowSet::new();
    let (index, inserted) = table.insert(0i32).unwrap();
    assert!(inserted);
    for _ in 0..1_000 {
        assert_eq!(table.insert(0).unwrap(), (index, false));
    }
    assert_eq!(table.len(), 1);
    assert_eq!(table.capacity(), 64);
}

#[test]
fn erase() {
    let mut table = ShadowSet::new();
    assert!(!table.remove(&100_500));
    for i in 0..10i32 {
        table.insert(i).unwrap();
    }
    for i in 0..10i32 {
        assert!(table.remove(&i));
        assert!(!table.remove(&i));
        assert!(!table.remove(&(i + 10)));
    }
    assert!(table.is_empty());
}

#[test]
fn contains() {
    let mut table = ShadowSet::new();
    for i in 0..10i32 {
        table.insert(i).unwrap();
    }
    for i in 0..10i32 {
        assert!(table.contains(&i));
        assert!(!table.contains(&(i + 10)));
        table.remove(&i);
        assert!(!table.contains(&i));
    }
}

/// Bit-pattern wrapper standing in for a float key; `f64` itself carries
/// neither `Eq` nor `Hash`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
struct Real(u64);

impl From<f64> for Real {
    fn from(value: f64) -> Self {
        Real(value.to_bits())
    }
}

#[test]
fn real_keys() {
    let mut table = ShadowSet::new();
    table.insert(Real::from(0.5)).unwrap();
    assert!(table.contains(&Real::from(0.5)));
    assert!(table.remove(&Real::from(0.5)));
    assert!(!table.contains(&Real::from(0.5)));
}

#[test]
fn string_keys() {
    let mut table: ShadowSet<String> = ShadowSet::new();
    let (_, inserted) = table.insert("Apple".to_string()).unwrap();
    assert!(inserted);
    table.insert("Banana".to_string()).unwrap();
    table.insert("Peach".to_string()).unwrap();
    assert!(table.contains("Banana"));
    assert!(!table.contains("Burger"));
    assert!(table.remove("Banana"));
    assert!(!table.contains("Banana"));
    assert!(!table.remove("Banana"));

    let mut another: ShadowSet<String> = ShadowSet::new();
    for i in 0..1_000i32 {
        assert_eq!(another.len(), i as usize);
        another.insert(i.to_string()).unwrap();
    }
    assert_eq!(another.len(), 1_000);
    assert!(another.contains("228"));
    assert!(!another.contains("-1"));
}

#[test]
fn custom_hashers() {
    let mut table: ShadowSet<i32, BuildHasherDefault<DefaultHasher>> =
        ShadowSet::with_hasher(BuildHasherDefault::default());
    for i in 0..1_000 {
        let (_, inserted) = table.insert(i).unwrap();
        assert!(inserted);
    }
    for i in 0..1_000 {
        assert!(table.contains(&i));
        assert!(!table.contains(&(i + 1_000)));
    }
}

#[test]
fn big_shadow() {
    let mut rng = thread_rng();
    let mut to_insert: Vec<i32> = (0..100_000).collect();
    to_insert.shuffle(&mut rng);

    let mut table = ShadowSet::new();
    for &v in &to_insert {
        table.insert(v).unwrap();
    }
    assert_eq!(table.len(), 100_000);

    to_insert.shuffle(&mut rng);
    for i in (0..100_000).step_by(10) {
        assert!(table.remove(&to_insert[i]));
    }
    assert_eq!(table.len(), 90_000);

    for (i, v) in to_insert.iter().enumerate() {
        assert_eq!(table.contains(v), i % 10 != 0);
    }
}

#[test]
fn big_random_enumerate() {
    let mut rng = thread_rng();
    let mut elems: HashSet<i32> = HashSet::new();
    while elems.len() < 100_000 {
        elems.insert(rng.gen_range(0..1_000_000_000));
    }
    let mut to_insert: Vec<i32> = elems.iter().copied().collect();
    to_insert.shuffle(&mut rng);

    let mut table = ShadowSet::new();
    for &v in &to_insert {
        let (_, inserted) = table.insert(v).unwrap();
        assert!(inserted);
    }
    assert_eq!(table.len(), 100_000);

    // Each element sits in exactly one slot.
    let mut remaining = elems;
    for key in table.iter() {
        assert!(remaining.remove(key), "{} enumerated twice or never added", key);
    }
    assert!(remaining.is_empty());

    for i in 0..1_000_000 {
        assert!(table.contains(&to_insert[i % 100_000]));
    }
}
