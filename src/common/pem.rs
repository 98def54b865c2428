//! Splitting of concatenated PEM bundles.

use once_cell::sync::Lazy;
use regex::Regex;

static PEM_BLOCK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)-{3,}BEGIN [^-]+-{3,}.*?-{3,}END [^-]+-{3,}").unwrap()
});

/// Dashes a marker needs to be recognised.
const MIN_DASHES: usize = 3;

/// Split a PEM bundle into its individual blocks, in input order.
///
/// Each returned block uses `\n` line endings and ends with a single trailing
/// newline. Blocks do not need blank lines between them. Input without any
/// complete `BEGIN`/`END` pair yields an empty vector.
pub fn split_pem_bundle(bundle: &[u8]) -> Vec<String> {
    let text = String::from_utf8_lossy(bundle).replace("\r\n", "\n");

    let mut blocks = Vec::new();
    let mut pos = 0;
    while let Some(found) = PEM_BLOCK.find_at(&text, pos) {
        let end = block_end(&text, found.start(), found.end());
        let mut block = text[found.start()..end].to_string();
        block.push('\n');
        blocks.push(block);
        pos = end;
    }
    blocks
}

/// End of the block matched at `start..end`. When the closing dash run runs
/// straight into the next `BEGIN`, the END marker keeps as many dashes as it
/// opened with and the rest go to the following block.
fn block_end(text: &str, start: usize, end: usize) -> usize {
    if !text[end..].starts_with("BEGIN ") {
        return end;
    }
    let block = &text[start..end];
    let Some(end_at) = block.rfind("END ") else {
        return end;
    };
    let run = dash_run(block);
    let opening = dash_run(&block[..end_at]);
    let keep = opening
        .min(run.saturating_sub(MIN_DASHES))
        .max(MIN_DASHES)
        .min(run);
    end - (run - keep)
}

/// Number of trailing `-` characters.
fn dash_run(s: &str) -> usize {
    s.len() - s.trim_end_matches('-').len()
}
