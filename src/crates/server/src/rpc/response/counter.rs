use super::format_timestamp;
use domain::counter::Counter as CounterAggregate;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct Counter {
    pub id: i64,
    pub count: i64,
    pub updated_at: String,
}

impl From<CounterAggregate> for Counter {
    fn from(counter: CounterAggregate) -> Self {
        Self {
            id: counter.id.as_i64(),
            count: counter.count,
            updated_at: format_timestamp(counter.updated_at),
        }
    }
}
