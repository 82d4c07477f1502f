//! Fixed-window truncation and striding over token sequences.

use crate::config::Truncate;
use crate::vocab::{Special, Token};

const PAD: Token = Token::Special(Special::Pad);

/// Split a tokenized sequence into model-input windows.
///
/// `body` is the framed sequence (bos + tokens + eos); `prefix` is the
/// instrument-name prefix. For `none` and `default` the prefix is part of
/// the single window and counts against the length budget. For `strided`
/// the prefix is re-prepended to every window, and every window except
/// possibly the last has exactly `max_seq_len` tokens.
pub(crate) fn apply(
    prefix: &[Token],
    body: Vec<Token>,
    truncate: Truncate,
    max_seq_len: usize,
    stride_len: usize,
    padding: bool,
) -> Vec<Vec<Token>> {
    match truncate {
        Truncate::None => {
            let mut seq = prefix.to_vec();
            seq.extend(body);
            vec![seq]
        }
        Truncate::Default => {
            let mut seq = prefix.to_vec();
            seq.extend(body);
            if padding && seq.len() < max_seq_len {
                seq.resize(max_seq_len, PAD);
            }
            seq.truncate(max_seq_len);
            vec![seq]
        }
        Truncate::Strided => {
            let span = max_seq_len.saturating_sub(prefix.len());
            let mut windows = Vec::new();
            let mut offset = 0;

            while offset + span < body.len() {
                let mut window = prefix.to_vec();
                window.extend_from_slice(&body[offset..offset + span]);
                windows.push(window);
                offset += stride_len;
            }

            let mut last = prefix.to_vec();
            let start = offset.min(body.len());
            let end = (offset + span).min(body.len());
            last.extend_from_slice(&body[start..end]);
            if padding && last.len() < max_seq_len {
                last.resize(max_seq_len, PAD);
            }
            windows.push(last);

            windows
        }
    }
}
