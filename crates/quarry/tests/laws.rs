mod common;

use common::{Item, seeded};
use proptest::prelude::*;
use quarry::prelude::*;

///
/// Shape
/// Generated criterion tree, rendered against `Item` on demand.
///

#[derive(Clone, Debug)]
enum Shape {
    SizeIs(u32),
    SizeAbove(u32),
    SizeBetween(u32, u32),
    LabelStarts(String),
    WeightPresent,
    WeightBelow(i64),
    SizeIn(Vec<u32>),
    And(Box<Shape>, Box<Shape>),
    Or(Box<Shape>, Box<Shape>),
    Not(Box<Shape>),
}

impl Shape {
    fn criterion(&self) -> Criterion<Item> {
        let item = Item::criteria();

        match self {
            Self::SizeIs(n) => item.size.is(*n),
            Self::SizeAbove(n) => item.size.greater_than(*n),
            Self::SizeBetween(lo, hi) => item.size.between(*lo, *hi),
            Self::LabelStarts(prefix) => item.label.starts_with(prefix.clone()),
            Self::WeightPresent => item.weight.is_present(),
            Self::WeightBelow(n) => item.weight.less_than(*n),
            Self::SizeIn(values) => item.size.in_(values.clone()),
            Self::And(a, b) => a.criterion().and(b.criterion()),
            Self::Or(a, b) => a.criterion().or(b.criterion()),
            Self::Not(a) => a.criterion().not(),
        }
    }
}

fn arb_shape() -> impl Strategy<Value = Shape> {
    let leaf = prop_oneof![
        (0..20_u32).prop_map(Shape::SizeIs),
        (0..20_u32).prop_map(Shape::SizeAbove),
        (0..20_u32, 0..20_u32).prop_map(|(lo, hi)| Shape::SizeBetween(lo, hi)),
        "[ab]{0,2}".prop_map(Shape::LabelStarts),
        Just(Shape::WeightPresent),
        (-5..5_i64).prop_map(Shape::WeightBelow),
        prop::collection::vec(0..20_u32, 1..4).prop_map(Shape::SizeIn),
    ];

    leaf.prop_recursive(3, 16, 2, |inner| {
        prop_oneof![
            (inner.clone(), inner.clone()).prop_map(|(a, b)| Shape::And(Box::new(a), Box::new(b))),
            (inner.clone(), inner.clone()).prop_map(|(a, b)| Shape::Or(Box::new(a), Box::new(b))),
            inner.prop_map(|a| Shape::Not(Box::new(a))),
        ]
    })
}

fn arb_items() -> impl Strategy<Value = Vec<Item>> {
    prop::collection::vec(
        (0..20_u32, "[abc]{0,3}", prop::option::of(-5..5_i64)),
        0..12,
    )
    .prop_map(|rows| {
        rows.into_iter()
            .zip(1_u64..)
            .map(|((size, label, weight), id)| Item {
                id,
                size,
                label,
                weight,
            })
            .collect()
    })
}

fn ids(repo: &SyncRepository<Item>, criterion: Criterion<Item>) -> Vec<u64> {
    repo.find(criterion)
        .fetch()
        .expect("fetch")
        .into_iter()
        .map(|item| item.id)
        .collect()
}

proptest! {
    #[test]
    fn excluded_middle_matches_everything(shape in arb_shape(), items in arb_items()) {
        let backend = seeded(&items);
        let repo = SyncRepository::<Item>::new(&backend);
        let c = shape.criterion();

        prop_assert_eq!(ids(&repo, c.clone().or(c.not())), ids(&repo, Criterion::all()));
    }

    #[test]
    fn contradiction_matches_nothing(shape in arb_shape(), items in arb_items()) {
        let backend = seeded(&items);
        let repo = SyncRepository::<Item>::new(&backend);
        let c = shape.criterion();

        prop_assert!(ids(&repo, c.clone().and(c.not())).is_empty());
    }

    #[test]
    fn count_agrees_with_fetch(shape in arb_shape(), items in arb_items()) {
        let backend = seeded(&items);
        let repo = SyncRepository::<Item>::new(&backend);
        let reader = repo.find(shape.criterion());

        let fetched = reader.fetch().expect("fetch");
        let counted = reader.count().expect("count");

        prop_assert_eq!(counted, fetched.len() as u64);
    }

    #[test]
    fn between_is_a_closed_range(lo in 0..20_u32, hi in 0..20_u32, items in arb_items()) {
        let backend = seeded(&items);
        let repo = SyncRepository::<Item>::new(&backend);
        let item = repo.criteria().clone();

        let between = ids(&repo, item.size.between(lo, hi));
        if lo <= hi {
            let bounds = item.size.at_least(lo).and(item.size.at_most(hi));
            prop_assert_eq!(between, ids(&repo, bounds));
        } else {
            prop_assert!(between.is_empty());
        }
    }

    #[test]
    fn inserted_record_is_found_by_identity(items in arb_items()) {
        let backend = InMemoryBackend::new();
        let repo = SyncRepository::<Item>::new(&backend);
        let item = repo.criteria().clone();

        for record in &items {
            repo.insert(record).expect("insert");
            let found = repo.find(item.id.is(record.id)).fetch().expect("fetch");
            prop_assert_eq!(found, vec![record.clone()]);
        }
    }

    #[test]
    fn projection_agrees_with_records(shape in arb_shape(), items in arb_items()) {
        let backend = seeded(&items);
        let repo = SyncRepository::<Item>::new(&backend);
        let item = repo.criteria().clone();
        let c = shape.criterion();

        let projected = repo
            .find(c.clone())
            .order_by(item.size.desc())
            .select((item.label.clone(), item.weight.clone()))
            .fetch()
            .expect("select");
        let records: Vec<(String, Option<i64>)> = repo
            .find(c)
            .order_by(item.size.desc())
            .fetch()
            .expect("fetch")
            .into_iter()
            .map(|record| (record.label, record.weight))
            .collect();

        prop_assert_eq!(projected, records);
    }
}
