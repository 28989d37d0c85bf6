use crate::domain::model::ElementData;
use crate::utils::error::{Result, ShimError};

/// 解析後的選擇器（逗號分隔的群組）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorList {
    pub(crate) source: String,
    pub(crate) chains: Vec<SelectorChain>,
}

/// 單一選擇器鏈，右端為目標節點
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorChain {
    pub(crate) parts: Vec<SelectorPart>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SelectorPart {
    pub(crate) step: SelectorStep,
    // 與左側步驟的關係；鏈首為 None
    pub(crate) combinator: Option<Combinator>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Combinator {
    Descendant,
    Child,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct SelectorStep {
    pub(crate) tag: Option<String>,
    pub(crate) universal: bool,
    pub(crate) id: Option<String>,
    pub(crate) classes: Vec<String>,
    pub(crate) attrs: Vec<AttrCondition>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum AttrCondition {
    Exists { name: String },
    Eq { name: String, value: String },
}

impl SelectorList {
    pub fn source(&self) -> &str {
        &self.source
    }
}

impl SelectorStep {
    /// 節點本身是否符合此步驟（不含祖先關係）
    pub(crate) fn matches(&self, element: &ElementData) -> bool {
        if let Some(tag) = &self.tag {
            if !element.tag.eq_ignore_ascii_case(tag) {
                return false;
            }
        }

        if let Some(id) = &self.id {
            if element.attrs.get("id") != Some(id) {
                return false;
            }
        }

        if self.classes.iter().any(|class| !element.has_class(class)) {
            return false;
        }

        for cond in &self.attrs {
            let matched = match cond {
                AttrCondition::Exists { name } => element.attrs.contains_key(name),
                AttrCondition::Eq { name, value } => element.attrs.get(name) == Some(value),
            };
            if !matched {
                return false;
            }
        }

        true
    }
}

pub fn parse(selector: &str) -> Result<SelectorList> {
    let trimmed = selector.trim();
    if trimmed.is_empty() {
        return Err(unsupported(selector, "selector is empty"));
    }

    let mut chains = Vec::new();
    for group in split_groups(selector)? {
        chains.push(parse_chain(selector, &group)?);
    }

    Ok(SelectorList {
        source: trimmed.to_string(),
        chains,
    })
}

/// 依頂層逗號切分群組；方括號與引號內的逗號不算
fn split_groups(selector: &str) -> Result<Vec<String>> {
    let mut groups = Vec::new();
    let mut current = String::new();
    let mut bracket_depth = 0usize;
    let mut quote: Option<char> = None;

    for ch in selector.chars() {
        match ch {
            '\'' | '"' => {
                match quote {
                    None => quote = Some(ch),
                    Some(open) if open == ch => quote = None,
                    Some(_) => {}
                }
                current.push(ch);
            }
            '[' if quote.is_none() => {
                bracket_depth += 1;
                current.push(ch);
            }
            ']' if quote.is_none() => {
                if bracket_depth == 0 {
                    return Err(unsupported(selector, "unbalanced ']'"));
                }
                bracket_depth -= 1;
                current.push(ch);
            }
            ',' if bracket_depth == 0 && quote.is_none() => {
                let trimmed = current.trim();
                if trimmed.is_empty() {
                    return Err(unsupported(selector, "empty selector group"));
                }
                groups.push(trimmed.to_string());
                current.clear();
            }
            _ => current.push(ch),
        }
    }

    if bracket_depth != 0 {
        return Err(unsupported(selector, "unclosed '['"));
    }
    if quote.is_some() {
        return Err(unsupported(selector, "unclosed quote"));
    }

    let trimmed = current.trim();
    if trimmed.is_empty() {
        return Err(unsupported(selector, "empty selector group"));
    }
    groups.push(trimmed.to_string());
    Ok(groups)
}

fn parse_chain(source: &str, group: &str) -> Result<SelectorChain> {
    let tokens = tokenize(source, group)?;
    let mut parts = Vec::new();
    let mut pending: Option<Combinator> = None;

    for token in tokens {
        if token == ">" {
            if pending.is_some() || parts.is_empty() {
                return Err(unsupported(source, "misplaced '>' combinator"));
            }
            pending = Some(Combinator::Child);
            continue;
        }
        if token == "+" || token == "~" {
            return Err(unsupported(source, "sibling combinators are not supported"));
        }

        let step = parse_step(source, &token)?;
        let combinator = if parts.is_empty() {
            None
        } else {
            Some(pending.take().unwrap_or(Combinator::Descendant))
        };
        parts.push(SelectorPart { step, combinator });
    }

    if parts.is_empty() || pending.is_some() {
        return Err(unsupported(source, "dangling combinator"));
    }

    Ok(SelectorChain { parts })
}

fn tokenize(source: &str, group: &str) -> Result<Vec<String>> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut bracket_depth = 0usize;
    let mut quote: Option<char> = None;

    for ch in group.chars() {
        match ch {
            '\'' | '"' => {
                match quote {
                    None => quote = Some(ch),
                    Some(open) if open == ch => quote = None,
                    Some(_) => {}
                }
                current.push(ch);
            }
            '[' if quote.is_none() => {
                bracket_depth += 1;
                current.push(ch);
            }
            ']' if quote.is_none() => {
                if bracket_depth == 0 {
                    return Err(unsupported(source, "unbalanced ']'"));
                }
                bracket_depth -= 1;
                current.push(ch);
            }
            '>' | '+' | '~' if bracket_depth == 0 && quote.is_none() => {
                if !current.trim().is_empty() {
                    tokens.push(current.trim().to_string());
                }
                current.clear();
                tokens.push(ch.to_string());
            }
            ch if ch.is_ascii_whitespace() && bracket_depth == 0 && quote.is_none() => {
                if !current.trim().is_empty() {
                    tokens.push(current.trim().to_string());
                }
                current.clear();
            }
            _ => current.push(ch),
        }
    }

    if !current.trim().is_empty() {
        tokens.push(current.trim().to_string());
    }

    Ok(tokens)
}

fn parse_step(source: &str, part: &str) -> Result<SelectorStep> {
    let bytes = part.as_bytes();
    let mut i = 0usize;
    let mut step = SelectorStep::default();

    while i < bytes.len() {
        match bytes[i] {
            b'*' => {
                if step.universal
                    || step.tag.is_some()
                    || step.id.is_some()
                    || !step.classes.is_empty()
                    || !step.attrs.is_empty()
                {
                    return Err(unsupported(source, "misplaced '*'"));
                }
                step.universal = true;
                i += 1;
            }
            b'#' => {
                let Some((id, next)) = parse_ident(part, i + 1) else {
                    return Err(unsupported(source, "'#' without an identifier"));
                };
                if step.id.replace(id).is_some() {
                    return Err(unsupported(source, "more than one '#id' in a step"));
                }
                i = next;
            }
            b'.' => {
                let Some((class, next)) = parse_ident(part, i + 1) else {
                    return Err(unsupported(source, "'.' without a class name"));
                };
                step.classes.push(class);
                i = next;
            }
            b'[' => {
                let (cond, next) = parse_attr_condition(source, part, i)?;
                step.attrs.push(cond);
                i = next;
            }
            b':' => {
                return Err(unsupported(source, "pseudo-classes are not supported"));
            }
            _ => {
                if step.tag.is_some()
                    || step.universal
                    || step.id.is_some()
                    || !step.classes.is_empty()
                    || !step.attrs.is_empty()
                {
                    return Err(unsupported(source, "tag name must come first in a step"));
                }
                let Some((tag, next)) = parse_ident(part, i) else {
                    return Err(unsupported(source, "unexpected character in selector"));
                };
                step.tag = Some(tag);
                i = next;
            }
        }
    }

    if step.tag.is_none()
        && !step.universal
        && step.id.is_none()
        && step.classes.is_empty()
        && step.attrs.is_empty()
    {
        return Err(unsupported(source, "empty selector step"));
    }

    Ok(step)
}

fn parse_ident(src: &str, start: usize) -> Option<(String, usize)> {
    let bytes = src.as_bytes();
    if start >= bytes.len() || !is_ident_char(bytes[start]) {
        return None;
    }
    let mut end = start + 1;
    while end < bytes.len() && is_ident_char(bytes[end]) {
        end += 1;
    }
    Some((src.get(start..end)?.to_string(), end))
}

fn is_ident_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'-'
}

fn parse_attr_condition(source: &str, part: &str, open: usize) -> Result<(AttrCondition, usize)> {
    let bytes = part.as_bytes();
    let mut i = open + 1;

    while i < bytes.len() && bytes[i].is_ascii_whitespace() {
        i += 1;
    }

    let name_start = i;
    while i < bytes.len() && is_ident_char(bytes[i]) {
        i += 1;
    }
    if name_start == i {
        return Err(unsupported(source, "attribute condition without a name"));
    }
    let name = part
        .get(name_start..i)
        .ok_or_else(|| unsupported(source, "attribute condition without a name"))?
        .to_ascii_lowercase();

    while i < bytes.len() && bytes[i].is_ascii_whitespace() {
        i += 1;
    }

    match bytes.get(i) {
        Some(b']') => Ok((AttrCondition::Exists { name }, i + 1)),
        Some(b'=') => {
            i += 1;
            while i < bytes.len() && bytes[i].is_ascii_whitespace() {
                i += 1;
            }
            let (value, mut next) = parse_attr_value(source, part, i)?;
            while next < bytes.len() && bytes[next].is_ascii_whitespace() {
                next += 1;
            }
            if bytes.get(next) != Some(&b']') {
                return Err(unsupported(source, "attribute condition missing ']'"));
            }
            Ok((AttrCondition::Eq { name, value }, next + 1))
        }
        Some(_) => Err(unsupported(
            source,
            "only [attr] and [attr='value'] conditions are supported",
        )),
        None => Err(unsupported(source, "attribute condition missing ']'")),
    }
}

fn parse_attr_value(source: &str, part: &str, start: usize) -> Result<(String, usize)> {
    let bytes = part.as_bytes();
    if start >= bytes.len() {
        return Err(unsupported(source, "attribute condition missing a value"));
    }

    if bytes[start] == b'\'' || bytes[start] == b'"' {
        let quote = bytes[start];
        let mut i = start + 1;
        while i < bytes.len() {
            if bytes[i] == quote {
                let raw = part
                    .get(start + 1..i)
                    .ok_or_else(|| unsupported(source, "invalid attribute value"))?;
                return Ok((raw.to_string(), i + 1));
            }
            i += 1;
        }
        return Err(unsupported(source, "unterminated attribute value quote"));
    }

    let mut i = start;
    while i < bytes.len() && bytes[i] != b']' && !bytes[i].is_ascii_whitespace() {
        i += 1;
    }
    if i == start {
        return Err(unsupported(source, "attribute condition missing a value"));
    }
    let raw = part
        .get(start..i)
        .ok_or_else(|| unsupported(source, "invalid attribute value"))?;
    Ok((raw.to_string(), i))
}

fn unsupported(selector: &str, reason: &str) -> ShimError {
    ShimError::SelectorError {
        selector: selector.trim().to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_sidebar_search_selector() {
        let list = parse("  .sidebar-search input[type='search'] ").unwrap();
        assert_eq!(list.source(), ".sidebar-search input[type='search']");
        assert_eq!(list.chains.len(), 1);

        let parts = &list.chains[0].parts;
        assert_eq!(parts.len(), 2);

        assert_eq!(parts[0].step.classes, vec!["sidebar-search".to_string()]);
        assert!(parts[0].combinator.is_none());

        assert_eq!(parts[1].step.tag.as_deref(), Some("input"));
        assert_eq!(parts[1].combinator, Some(Combinator::Descendant));
        assert_eq!(
            parts[1].step.attrs,
            vec![AttrCondition::Eq {
                name: "type".to_string(),
                value: "search".to_string(),
            }]
        );
    }

    #[test]
    fn test_parse_child_combinator_and_groups() {
        let list = parse("nav > a.active, #main-search").unwrap();
        assert_eq!(list.chains.len(), 2);

        let first = &list.chains[0].parts;
        assert_eq!(first[1].combinator, Some(Combinator::Child));
        assert_eq!(first[1].step.classes, vec!["active".to_string()]);

        let second = &list.chains[1].parts;
        assert_eq!(second[0].step.id.as_deref(), Some("main-search"));
    }

    #[test]
    fn test_parse_double_quoted_attr_value() {
        let list = parse("input[type=\"search\"]").unwrap();
        assert_eq!(
            list.chains[0].parts[0].step.attrs,
            vec![AttrCondition::Eq {
                name: "type".to_string(),
                value: "search".to_string(),
            }]
        );
    }

    #[test]
    fn test_parse_bare_attr_value_and_exists() {
        let list = parse("input[type=search][disabled]").unwrap();
        let attrs = &list.chains[0].parts[0].step.attrs;
        assert_eq!(attrs.len(), 2);
        assert_eq!(
            attrs[1],
            AttrCondition::Exists {
                name: "disabled".to_string()
            }
        );
    }

    #[test]
    fn test_parse_rejects_unsupported_syntax() {
        assert!(parse("").is_err());
        assert!(parse("   ").is_err());
        assert!(parse("a + b").is_err());
        assert!(parse("a ~ b").is_err());
        assert!(parse("input:focus").is_err());
        assert!(parse("input[type='search'").is_err());
        assert!(parse("> input").is_err());
        assert!(parse("div >").is_err());
        assert!(parse("div,,span").is_err());
    }

    #[test]
    fn test_parse_rejects_misordered_compound_parts() {
        // 標籤與 * 都必須是複合步驟的第一個成分
        assert!(parse("[type='search']input").is_err());
        assert!(parse(".sidebar-search*").is_err());
        assert!(parse("#main-search*").is_err());

        // 正常順序下同樣的成分仍可解析
        assert!(parse("input[type='search']").is_ok());
        assert!(parse("*.sidebar-search").is_ok());
    }

    #[test]
    fn test_step_matches_element() {
        let mut element = ElementData::new("input");
        element.set_attr("type", "search");
        element.set_attr("class", "wy-form sidebar-input");

        let list = parse("input[type='search'].sidebar-input").unwrap();
        assert!(list.chains[0].parts[0].step.matches(&element));

        let list = parse("input[type='text']").unwrap();
        assert!(!list.chains[0].parts[0].step.matches(&element));

        // 標籤比對不分大小寫
        let list = parse("INPUT").unwrap();
        assert!(list.chains[0].parts[0].step.matches(&element));
    }
}
