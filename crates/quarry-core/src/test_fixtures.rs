use crate::{memory::InMemoryBackend, repository::SyncRepository, traits::Record};
use quarry_derive::Record;
use time::{Date, macros::date};

///
/// LocalDateHolder
///

#[derive(Clone, Debug, PartialEq, Record)]
pub(crate) struct LocalDateHolder {
    #[record(id)]
    pub id: String,
    pub value: Date,
    #[record(nullable)]
    pub nullable: Option<Date>,
    pub optional: Option<Date>,
    pub list: Vec<Date>,
}

impl LocalDateHolder {
    pub(crate) fn new(id: &str, value: Date) -> Self {
        Self {
            id: id.to_string(),
            value,
            nullable: None,
            optional: None,
            list: Vec::new(),
        }
    }
}

///
/// Address
///

#[derive(Clone, Debug, PartialEq, Record)]
pub(crate) struct Address {
    pub city: String,
    pub zip: Option<String>,
}

///
/// Person
///

#[derive(Clone, Debug, PartialEq, Record)]
#[record(rename_all = "camelCase")]
pub(crate) struct Person {
    #[record(id)]
    pub id: u64,
    pub first_name: String,
    pub age: u32,
    pub score: i64,
    pub nickname: Option<String>,
    pub address: Address,
    pub tags: Vec<String>,
    pub previous: Vec<Address>,
}

pub(crate) fn address(city: &str) -> Address {
    Address {
        city: city.to_string(),
        zip: None,
    }
}

pub(crate) fn person(id: u64, first_name: &str, age: u32, city: &str) -> Person {
    Person {
        id,
        first_name: first_name.to_string(),
        age,
        score: 0,
        nickname: None,
        address: address(city),
        tags: Vec::new(),
        previous: Vec::new(),
    }
}

/// Five people across three cities.
pub(crate) fn people() -> Vec<Person> {
    let mut ada = person(1, "Ada", 36, "London");
    ada.score = 90;
    ada.nickname = Some("countess".to_string());
    ada.tags = vec!["math".to_string(), "poetry".to_string()];

    let mut alan = person(2, "Alan", 41, "London");
    alan.score = 75;
    alan.tags = vec!["math".to_string()];
    alan.previous = vec![address("Wilmslow")];

    let mut grace = person(3, "Grace", 85, "Arlington");
    grace.score = 88;
    grace.nickname = Some("amazing".to_string());
    grace.previous = vec![address("New York"), address("Philadelphia")];

    let mut edsger = person(4, "Edsger", 72, "Austin");
    edsger.score = -5;

    let barbara = person(5, "Barbara", 30, "Arlington");

    vec![ada, alan, grace, edsger, barbara]
}

pub(crate) fn people_backend() -> InMemoryBackend {
    seeded(&people())
}

pub(crate) fn seeded<T: Record>(records: &[T]) -> InMemoryBackend {
    let backend = InMemoryBackend::new();
    let repository = SyncRepository::<T>::new(&backend);
    if let Err(err) = repository.insert_all(records) {
        panic!("seeding {} failed: {err}", T::model().name);
    }

    backend
}

pub(crate) const D1: Date = date!(2010 - 05 - 01);
pub(crate) const D2: Date = date!(2010 - 10 - 02);
