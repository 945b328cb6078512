#![no_main]

use std::io::{self, Cursor};

use fieldjoin::cancel::CancellationToken;
use fieldjoin::config::{JoinOptions, MissingFieldPolicy, UnpairedSides, UnpairedStrategy};
use fieldjoin::pipeline::{run_join, Diagnostics, NamedInput};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // First byte picks the options, the rest is split into the two inputs
    let Some((&flags, rest)) = data.split_first() else {
        return;
    };
    let split = rest.iter().position(|b| *b == 0).unwrap_or(rest.len());
    let (left, right) = rest.split_at(split);

    let options = JoinOptions {
        left_field: 1 + (flags & 0b11) as usize,
        right_field: 1 + ((flags >> 2) & 0b11) as usize,
        ignore_case: flags & 0x10 != 0,
        unpaired: UnpairedSides {
            left: flags & 0x20 != 0,
            right: flags & 0x40 != 0,
        },
        unpaired_strategy: if flags & 0x80 != 0 {
            UnpairedStrategy::Immediate
        } else {
            UnpairedStrategy::Deferred
        },
        missing_field: if flags & 0x01 != 0 {
            MissingFieldPolicy::Exclude
        } else {
            MissingFieldPolicy::EmptyKey
        },
        ..JoinOptions::default()
    };

    let token = CancellationToken::new();
    let mut out = Vec::new();
    let mut diag = Diagnostics::new(io::sink(), false);
    let stats = run_join(
        &options,
        NamedInput::new("left", Cursor::new(left)),
        NamedInput::new("right", Cursor::new(right)),
        &mut out,
        &mut diag,
        &token,
    )
    .expect("in-memory join cannot fail");

    let written = out.iter().filter(|b| **b == b'\n').count();
    assert_eq!(written, stats.rows_written());
});
