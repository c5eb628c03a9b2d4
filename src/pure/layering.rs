//! The layering comparator: a total order over clients enforcing
//! `desktop ≺ tiled ≺ float ≺ fullscreen`, with a per-operation up/down
//! tiebreak within a rank.

use std::cmp::Ordering;

/// The four stacking categories, ranked low to high.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Layer {
    Desktop,
    Tiled,
    Float,
    Full,
}

/// A one-shot direction used to break ties between clients in the same
/// [Layer] during a single sort pass. Passed into the comparator as a
/// parameter rather than stored as mutable state on the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StackOrder {
    Up,
    Down,
}

/// Compare two clients for stacking order given their layer and an
/// optional restack direction recorded against each (the client that
/// triggered a restack carries `Some(direction)`; all others `None`). `a_key`
/// /`b_key` break ties when both sides carry the same direction, so the
/// relation stays antisymmetric instead of collapsing two `Some(Up)` clients
/// onto the same rank regardless of argument order.
///
/// Antisymmetric, transitive and total over any set of clients: layer
/// comparison is a total order on [Layer], same-direction pairs fall back to
/// `K`'s order, and the remaining equal case defaults to "no change" (keeps
/// existing relative order, i.e. `Ordering::Equal`).
pub fn compare<K: Ord>(
    a_layer: Layer,
    a_dir: Option<StackOrder>,
    a_key: K,
    b_layer: Layer,
    b_dir: Option<StackOrder>,
    b_key: K,
) -> Ordering {
    match a_layer.cmp(&b_layer) {
        Ordering::Equal => (),
        other => return other,
    }

    match (a_dir, b_dir) {
        (Some(StackOrder::Up), Some(StackOrder::Up)) => a_key.cmp(&b_key),
        (Some(StackOrder::Down), Some(StackOrder::Down)) => a_key.cmp(&b_key),
        (Some(StackOrder::Up), _) => Ordering::Greater,
        (_, Some(StackOrder::Up)) => Ordering::Less,
        (Some(StackOrder::Down), _) => Ordering::Less,
        (_, Some(StackOrder::Down)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Sort `clients` into stacking order (bottom-first) using [compare], then
/// clear every recorded direction, matching the "cleared after sort" rule.
/// `key_of` supplies the stable tiebreak [compare] needs when two clients
/// share a layer and direction.
pub fn restack<T, K: Ord>(
    clients: &mut [T],
    layer_of: impl Fn(&T) -> Layer,
    dir_of: impl Fn(&T) -> Option<StackOrder>,
    key_of: impl Fn(&T) -> K,
    clear_dir: impl Fn(&mut T),
) {
    clients.sort_by(|a, b| {
        compare(layer_of(a), dir_of(a), key_of(a), layer_of(b), dir_of(b), key_of(b))
    });
    for c in clients.iter_mut() {
        clear_dir(c);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    struct C {
        id: u32,
        layer: Layer,
        dir: Option<StackOrder>,
    }

    #[test]
    fn total_order_over_layers() {
        assert_eq!(
            compare(Layer::Desktop, None, 0u32, Layer::Tiled, None, 0u32),
            Ordering::Less
        );
        assert_eq!(
            compare(Layer::Full, None, 0u32, Layer::Float, None, 0u32),
            Ordering::Greater
        );
    }

    #[test]
    fn antisymmetric() {
        let o1 = compare(Layer::Tiled, None, 0u32, Layer::Float, None, 0u32);
        let o2 = compare(Layer::Float, None, 0u32, Layer::Tiled, None, 0u32);
        assert_eq!(o1, o2.reverse());
    }

    #[test]
    fn antisymmetric_when_both_sides_share_a_direction() {
        let o1 = compare(Layer::Tiled, Some(StackOrder::Up), 1u32, Layer::Tiled, Some(StackOrder::Up), 2u32);
        let o2 = compare(Layer::Tiled, Some(StackOrder::Up), 2u32, Layer::Tiled, Some(StackOrder::Up), 1u32);
        assert_eq!(o1, o2.reverse());

        let o3 = compare(Layer::Tiled, Some(StackOrder::Down), 1u32, Layer::Tiled, Some(StackOrder::Down), 2u32);
        let o4 = compare(Layer::Tiled, Some(StackOrder::Down), 2u32, Layer::Tiled, Some(StackOrder::Down), 1u32);
        assert_eq!(o3, o4.reverse());
    }

    #[test]
    fn transitive_on_a_small_mixed_set() {
        let mut cs = vec![
            C {
                id: 1,
                layer: Layer::Float,
                dir: None,
            },
            C {
                id: 2,
                layer: Layer::Desktop,
                dir: None,
            },
            C {
                id: 3,
                layer: Layer::Full,
                dir: None,
            },
            C {
                id: 4,
                layer: Layer::Tiled,
                dir: None,
            },
        ];

        restack(&mut cs, |c| c.layer, |c| c.dir, |c| c.id, |c| c.dir = None);
        let ids: Vec<_> = cs.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![2, 4, 1, 3]);
    }

    #[test]
    fn up_direction_wins_tiebreak_within_layer() {
        let mut cs = vec![
            C {
                id: 1,
                layer: Layer::Tiled,
                dir: None,
            },
            C {
                id: 2,
                layer: Layer::Tiled,
                dir: Some(StackOrder::Up),
            },
        ];
        restack(&mut cs, |c| c.layer, |c| c.dir, |c| c.id, |c| c.dir = None);
        assert_eq!(cs[1].id, 2);
        assert!(cs.iter().all(|c| c.dir.is_none()));
    }

    #[test]
    fn same_direction_pair_breaks_tie_by_key_not_argument_order() {
        let mut cs = vec![
            C {
                id: 2,
                layer: Layer::Tiled,
                dir: Some(StackOrder::Up),
            },
            C {
                id: 1,
                layer: Layer::Tiled,
                dir: Some(StackOrder::Up),
            },
        ];
        restack(&mut cs, |c| c.layer, |c| c.dir, |c| c.id, |c| c.dir = None);
        let ids: Vec<_> = cs.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![1, 2]);
    }
}
