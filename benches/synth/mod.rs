mod envelope;
mod spectrum;

pub use envelope::bench_envelope;
pub use spectrum::bench_partial_bank;
