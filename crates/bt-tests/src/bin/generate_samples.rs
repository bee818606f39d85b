//! Writes the sample streams from `bt_tests::samples` to disk, for trying
//! out the `bt` CLI by hand.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin generate_samples -p bt-tests -- [OUT_DIR]
//! ```
//!
//! `OUT_DIR` defaults to `target/samples` under the workspace root.
//!
//! | File              | Contents                                         |
//! |-------------------|--------------------------------------------------|
//! | scalars.bt        | one message per integer width                    |
//! | nested.bt         | array holding a struct and a chain               |
//! | with_breaks.bt    | array aborted by a level-1 break, then a buffer  |
//! | deep_break.bt     | level-2 break unwinding two arrays               |
//! | truncated.bt      | `with_breaks.bt` minus its last byte             |

#![allow(clippy::pedantic)]

use std::path::{Path, PathBuf};

use bt_tests::samples;

fn main() {
    let out_dir = std::env::args().nth(1).map_or_else(
        || PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../target/samples"),
        PathBuf::from,
    );
    std::fs::create_dir_all(&out_dir).expect("create_dir_all");

    write_file(&out_dir.join("scalars.bt"), &samples::scalars());
    write_file(&out_dir.join("nested.bt"), &samples::nested());
    write_file(&out_dir.join("with_breaks.bt"), &samples::with_breaks());
    write_file(&out_dir.join("deep_break.bt"), &samples::deep_break());

    let mut truncated = samples::with_breaks();
    truncated.pop();
    write_file(&out_dir.join("truncated.bt"), &truncated);

    println!("All samples written to {}", out_dir.display());
}

fn write_file(path: &Path, data: &[u8]) {
    std::fs::write(path, data).expect("write_file");
    println!("  wrote {} ({} bytes)", path.display(), data.len());
}
