//! Prints the partial banks a few tunings produce for the reference note,
//! side by side. Handy for eyeballing what inharmonicity and brightness
//! actually do to the spectrum.
//!
//! Run with: cargo run --example spectrum_table

use stretta::spectrum::partial_bank;
use stretta::tuning::Tuning;

fn main() {
    let tunings = [
        ("12-EDO, pure", Tuning {
            inharmonicity: 0.0,
            ..Tuning::default()
        }),
        ("12-EDO, stretched", Tuning {
            inharmonicity: 0.01,
            ..Tuning::default()
        }),
        ("19-EDO, dark", Tuning {
            divisions: 19,
            brightness: 3.0,
            ..Tuning::default()
        }),
        ("Bohlen-Pierce", Tuning {
            interval_ratio: 3.0,
            divisions: 13,
            ..Tuning::default()
        }),
    ];

    for (name, tuning) in tunings {
        let bank = partial_bank(&tuning, 69).expect("default-range tunings are playable");
        println!("\n{name}");
        println!("{:>3}  {:>10}  {:>8}", "i", "freq (Hz)", "gain");
        for (i, partial) in bank.iter().enumerate() {
            println!(
                "{:>3}  {:>10.2}  {:>8.5}",
                i + 1,
                partial.frequency,
                partial.gain
            );
        }
    }
}
