/// Splits message text into word tokens. Tokens are returned verbatim, in order.
pub trait Segmenter: Send + Sync {
    fn segment(&self, text: &str) -> Vec<String>;
}

impl<F> Segmenter for F
where
    F: Fn(&str) -> Vec<String> + Send + Sync,
{
    fn segment(&self, text: &str) -> Vec<String> {
        self(text)
    }
}

/// Word-like runs of letters and digits, additionally broken where the script
/// switches between Han, Hiragana, Katakana and everything else.
#[derive(Debug, Default, Clone, Copy)]
pub struct WordSegmenter;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Script {
    Han,
    Hiragana,
    Katakana,
    Other,
}

const PROLONGED_SOUND_MARK: char = '\u{30FC}';

fn script_of(c: char) -> Script {
    match c as u32 {
        0x3040..=0x309F => Script::Hiragana,
        0x30A0..=0x30FF | 0x31F0..=0x31FF | 0xFF66..=0xFF9F => Script::Katakana,
        0x3005 | 0x3400..=0x4DBF | 0x4E00..=0x9FFF | 0xF900..=0xFAFF => Script::Han,
        _ => Script::Other,
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '\u{3005}'
}

fn is_apostrophe(c: char) -> bool {
    c == '\'' || c == '\u{2019}'
}

fn flush(out: &mut Vec<String>, current: &mut String) {
    if !current.is_empty() {
        out.push(std::mem::take(current));
    }
}

impl Segmenter for WordSegmenter {
    fn segment(&self, text: &str) -> Vec<String> {
        let chars: Vec<char> = text.chars().collect();
        let mut out = Vec::new();
        let mut current = String::new();
        let mut current_script: Option<Script> = None;

        for (i, &c) in chars.iter().enumerate() {
            // don't, it's
            if is_apostrophe(c)
                && !current.is_empty()
                && chars.get(i + 1).is_some_and(|next| next.is_alphabetic())
            {
                current.push(c);
                continue;
            }
            if !is_word_char(c) {
                flush(&mut out, &mut current);
                current_script = None;
                continue;
            }

            let script = if c == PROLONGED_SOUND_MARK {
                current_script.unwrap_or(Script::Katakana)
            } else {
                script_of(c)
            };
            if current_script.is_some_and(|s| s != script) {
                flush(&mut out, &mut current);
            }
            current.push(c);
            current_script = Some(script);
        }
        flush(&mut out, &mut current);
        out
    }
}
