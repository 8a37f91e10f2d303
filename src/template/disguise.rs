//! Disguise Liquid tags as mustache helper calls and reveal them again.
//!
//! The markup formatter understands `{{ helper 'argument' }}` statements but
//! not Liquid, so every top-level Liquid tag is carried through formatting as
//! an opaque quoted argument:
//!
//! ```text
//! {{ product.title }}   <->  {{ liquid 'product.title' }}
//! {% if a %}            <->  {{ liquid-block 'if a' }}
//! ```

use memchr::memmem;
use tracing::trace;

use super::token::{Token, pairs, render};
use crate::expr::{complete_filter_arguments, transpile, transpile_statement};
use crate::util::{decode_entities, escape_html};

const OUTPUT_HELPER: &str = "liquid";
const BLOCK_HELPER: &str = "liquid-block";

/// Replace each top-level output and block tag with a helper statement whose
/// argument is the HTML-escaped tag body.
pub fn disguise(tokens: &[Token]) -> String {
    let matches = pairs(tokens);
    let mut out = String::new();
    let mut i = 0;
    while i < tokens.len() {
        let helper = match tokens[i] {
            Token::OutputOpen => Some(OUTPUT_HELPER),
            Token::TagOpen => Some(BLOCK_HELPER),
            _ => None,
        };
        match (helper, matches[i]) {
            (Some(helper), Some(close)) => {
                let body = render(&tokens[i + 1..close]);
                out.push_str(&helper_statement(helper, body.trim()));
                i = close + 1;
            }
            _ => {
                out.push_str(tokens[i].as_str());
                i += 1;
            }
        }
    }
    out
}

fn helper_statement(helper: &str, body: &str) -> String {
    format!("{{{{ {helper} '{}' }}}}", escape_html(body))
}

/// Turn helper statements back into Liquid tags.
///
/// Each payload is unescaped and re-transpiled; payloads that are already
/// Liquid (filters, `and`/`or`, tags the transpiler does not know) fail to
/// transpile and are kept as they are.
pub fn reveal(markup: &str) -> String {
    let finder = memmem::Finder::new("{{");
    let mut out = String::with_capacity(markup.len());
    let mut rest = markup;

    while let Some(at) = finder.find(rest.as_bytes()) {
        out.push_str(&rest[..at]);
        let candidate = &rest[at..];
        match parse_helper(candidate) {
            Some((helper, payload, consumed)) => {
                out.push_str(&liquid_tag(helper, &decode_entities(payload)));
                rest = &candidate[consumed..];
            }
            None => {
                out.push_str("{{");
                rest = &candidate[2..];
            }
        }
    }
    out.push_str(rest);
    out
}

/// Parse `{{ helper 'payload' }}` at the start of `s`, returning the helper
/// name, the raw payload, and the number of bytes consumed.
fn parse_helper(s: &str) -> Option<(&'static str, &str, usize)> {
    let body = s.strip_prefix("{{")?.trim_start();
    // `liquid-block` first, since `liquid` is its prefix.
    let (helper, after) = [BLOCK_HELPER, OUTPUT_HELPER]
        .into_iter()
        .find_map(|helper| Some((helper, body.strip_prefix(helper)?)))?;
    if !after.starts_with(char::is_whitespace) {
        return None;
    }
    let after = after.trim_start();
    let quote = after.chars().next().filter(|c| *c == '\'' || *c == '"')?;
    let payload_len = after[1..].find(quote)?;
    let payload = &after[1..1 + payload_len];
    let tail = after[1 + payload_len + 1..].trim_start();
    let tail = tail.strip_prefix("}}")?;
    Some((helper, payload, s.len() - tail.len()))
}

fn liquid_tag(helper: &str, payload: &str) -> String {
    if helper == BLOCK_HELPER {
        let body = transpile_statement(payload).unwrap_or_else(|err| {
            trace!(%err, "keeping block tag as written");
            payload.to_string()
        });
        return format!("{{% {body} %}}");
    }

    let body = match transpile(payload) {
        Ok(liquid) => complete_filter_arguments(&liquid).into_owned(),
        Err(_) => complete_filter_arguments(payload).into_owned(),
    };
    // Keep whitespace-control dashes attached to the delimiters.
    let open = if body.starts_with('-') { "{{" } else { "{{ " };
    let close = if body.ends_with('-') { "}}" } else { " }}" };
    format!("{open}{body}{close}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::token::tokenize;

    #[test]
    fn test_disguise_output_and_block_tags() {
        let tokens = tokenize("{% if a %}<p>{{ title }}</p>{% endif %}");
        assert_eq!(
            disguise(&tokens),
            "{{ liquid-block 'if a' }}<p>{{ liquid 'title' }}</p>{{ liquid-block 'endif' }}"
        );
    }

    #[test]
    fn test_disguise_escapes_payload() {
        let tokens = tokenize("{{ a == 'x' }}");
        assert_eq!(disguise(&tokens), "{{ liquid 'a == &#39;x&#39;' }}");
    }

    #[test]
    fn test_reveal_restores_tags() {
        let markup = "{{ liquid-block 'for x in items' }}\n  {{ liquid 'x.title' }}\n{{ liquid-block 'endfor' }}";
        assert_eq!(
            reveal(markup),
            "{% for x in items %}\n  {{ x.title }}\n{% endfor %}"
        );
    }

    #[test]
    fn test_reveal_keeps_untranspilable_payload() {
        assert_eq!(
            reveal("{{ liquid 'price | money' }}"),
            "{{ price | money }}"
        );
        assert_eq!(
            reveal("{{ liquid-block 'assign x = 1' }}"),
            "{% assign x = 1 %}"
        );
    }

    #[test]
    fn test_reveal_completes_filter_arguments() {
        assert_eq!(
            reveal("{{ liquid 'image | img_url' }}"),
            "{{ image | img_url: 'master' }}"
        );
    }

    #[test]
    fn test_reveal_ignores_other_mustaches() {
        let markup = "{{ other 'x' }} {{liquidity 'y'}} {{ liquid x }}";
        assert_eq!(reveal(markup), markup);
    }

    #[test]
    fn test_round_trip_of_transpiled_output() {
        for expr in ["state.$index", "a === 'b' && c", "items.length > 2", "x.toUpperCase()"] {
            let liquid = format!("{{{{ {} }}}}", transpile(expr).unwrap());
            assert_eq!(reveal(&disguise(&tokenize(&liquid))), liquid, "expr: {expr}");
        }
    }

    #[test]
    fn test_round_trip_whitespace_control() {
        let liquid = "{{- title -}}";
        assert_eq!(reveal(&disguise(&tokenize(liquid))), liquid);
    }
}
