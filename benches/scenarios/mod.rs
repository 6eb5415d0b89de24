mod churn;

pub use churn::bench_note_churn;
