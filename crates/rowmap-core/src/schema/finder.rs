use super::{name::split_words, Injection, ModelId, Name, PropertyMeta, Schema, Step};
use crate::{Error, Result, Type};
use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};

/// How column names are compared with property names.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CaseSensitivity {
    #[default]
    Insensitive,
    Sensitive,
}

#[derive(Debug, Clone)]
pub struct FinderOptions {
    pub case: CaseSensitivity,

    /// Maximum number of steps in a resolved path
    pub max_depth: usize,

    /// Largest list position a column may address, as in `tags[4]`
    pub max_index: usize,

    /// Subtypes to consider when validating a path that continues into a
    /// sub-object of the keyed model
    pub variants: HashMap<ModelId, Vec<ModelId>>,
}

/// Result of resolving a column name.
#[derive(Debug, Clone)]
pub struct Resolved {
    pub property: Arc<PropertyMeta>,

    /// Remainder of the name when the path continues inside a sub-object.
    /// The sub-object's own builder resolves it.
    pub rest: Option<String>,
}

/// Resolves column names against one model for the duration of one plan
/// build.
///
/// Names are split into words on `_` and camel-case boundaries, and into
/// segments on `.`. A property matches a run of consecutive words within
/// one segment. `name[2]` selects a list position and `name[key]` a map
/// entry. A list of models followed by more words resolves to an appended
/// element of that list.
///
/// Resolution stops at the first sub-object that has words left over; the
/// leftover is returned in [`Resolved::rest`]. Every possible resolution is
/// considered, so a name with two valid readings is reported as ambiguous
/// instead of picking one.
#[derive(Debug)]
pub struct PropertyFinder {
    schema: Arc<Schema>,
    model: ModelId,
    options: FinderOptions,

    /// Interned nodes, by path from the model
    nodes: HashMap<Vec<Step>, Arc<PropertyMeta>>,

    /// Fields of the model that received at least one mapping
    mapped: HashSet<usize>,
}

#[derive(Debug, Clone, Copy)]
enum TokenKind<'a> {
    Word(&'a str),
    Bracket(&'a str),
}

#[derive(Debug, Clone, Copy)]
struct Token<'a> {
    kind: TokenKind<'a>,

    /// Byte offset in the column name
    start: usize,

    /// Preceded by `.`
    hard: bool,
}

#[derive(Debug)]
struct Candidate {
    steps: Vec<Step>,
    rest: Option<usize>,
}

#[derive(Debug, Default)]
struct Search {
    depth_exceeded: bool,

    /// Largest list position rejected for exceeding `max_index`
    index_exceeded: Option<usize>,
}

impl Default for FinderOptions {
    fn default() -> Self {
        FinderOptions {
            case: CaseSensitivity::default(),
            max_depth: 16,
            max_index: 4096,
            variants: HashMap::new(),
        }
    }
}

impl PropertyFinder {
    pub fn new(schema: Arc<Schema>, model: ModelId, options: FinderOptions) -> PropertyFinder {
        PropertyFinder {
            schema,
            model,
            options,
            nodes: HashMap::new(),
            mapped: HashSet::new(),
        }
    }

    pub fn model(&self) -> ModelId {
        self.model
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    pub fn options(&self) -> &FinderOptions {
        &self.options
    }

    /// Resolves `name` to a property node of the model.
    pub fn find(&mut self, name: &str) -> Result<Resolved> {
        let not_found = || Error::property_not_found(self.model_name(), name);

        let Some(tokens) = tokenize(name) else {
            return Err(crate::err!("unbalanced brackets").context(not_found()));
        };

        let mut search = Search::default();
        let mut candidates = vec![];
        self.fields(self.model, &tokens, 0, 0, &mut search, Some(&mut candidates));

        let mut unique: Vec<Candidate> = vec![];
        for candidate in candidates {
            if !unique.iter().any(|c| c.steps == candidate.steps) {
                unique.push(candidate);
            }
        }

        match unique.len() {
            0 if search.depth_exceeded => Err(crate::err!(
                "resolution depth limit of {} reached",
                self.options.max_depth
            )
            .context(not_found())),
            0 => match search.index_exceeded {
                Some(index) => Err(crate::err!(
                    "list position {index} exceeds the limit of {}",
                    self.options.max_index
                )
                .context(not_found())),
                None => Err(not_found()),
            },
            1 => {
                let candidate = &unique[0];
                let property = self.intern(&candidate.steps)?;
                let rest = candidate.rest.map(|pos| name[tokens[pos].start..].to_string());
                log::trace!(
                    "resolved `{name}` to `{}`{}",
                    property.path,
                    rest.as_deref().map(|rest| format!(" + `{rest}`")).unwrap_or_default()
                );
                Ok(Resolved { property, rest })
            }
            _ => {
                let mut described = Vec::with_capacity(unique.len());
                for candidate in &unique {
                    let node = self.intern(&candidate.steps)?;
                    described.push(match candidate.rest {
                        Some(pos) => format!("{}.{}", node.path, &name[tokens[pos].start..]),
                        None => node.path.clone(),
                    });
                }
                Err(Error::ambiguous_property(
                    self.model_name(),
                    name,
                    described,
                ))
            }
        }
    }

    /// Returns the shared node for `steps`, creating it and its ancestors on
    /// first use.
    pub fn intern(&mut self, steps: &[Step]) -> Result<Arc<PropertyMeta>> {
        if let Some(node) = self.nodes.get(steps) {
            return Ok(node.clone());
        }

        let Some((last, prefix)) = steps.split_last() else {
            crate::bail!("empty property path");
        };

        let parent = if prefix.is_empty() {
            None
        } else {
            Some(self.intern(prefix)?)
        };

        let (container, parent_path) = match &parent {
            Some(parent) => (parent.ty.clone(), parent.path.as_str()),
            None => (Type::Model(self.model), ""),
        };

        let (ty, nullable, injection, path) = match (last, &container) {
            (Step::Field(index), Type::Model(model_id)) => {
                let model = self.schema.model(*model_id);
                let Some(field) = model.fields.get(*index) else {
                    return Err(Error::property_not_found(
                        model.name.as_str(),
                        format!("#{index}"),
                    ));
                };

                let injection = match model.constructor_position(*index) {
                    Some(position) if parent.is_none() => Injection::Constructor(position),
                    _ => Injection::Setter,
                };

                let path = if parent_path.is_empty() {
                    field.name.to_string()
                } else {
                    format!("{parent_path}.{}", field.name)
                };

                (field.ty.clone(), field.nullable, injection, path)
            }
            (Step::Element, Type::List(inner)) => (
                (**inner).clone(),
                false,
                Injection::Setter,
                format!("{parent_path}[]"),
            ),
            (Step::Index(index), Type::List(inner)) => (
                (**inner).clone(),
                true,
                Injection::Setter,
                format!("{parent_path}[{index}]"),
            ),
            (Step::Key(key), Type::Map(inner)) => (
                (**inner).clone(),
                true,
                Injection::Setter,
                format!("{parent_path}[{key}]"),
            ),
            _ => {
                return Err(Error::property_not_found(
                    self.model_name(),
                    format!("{parent_path} {last:?}"),
                ))
            }
        };

        let node = Arc::new(PropertyMeta {
            step: last.clone(),
            ty,
            nullable,
            owner: self.model,
            injection,
            parent,
            path,
        });

        self.nodes.insert(steps.to_vec(), node.clone());
        Ok(node)
    }

    /// Records that `property` received a mapping.
    pub fn mark_mapped(&mut self, property: &PropertyMeta) {
        self.mapped.insert(property.root_field());
    }

    /// Names of constructor parameters that are required and were never
    /// mapped, in parameter order.
    pub fn missing_constructor_params(&self) -> Vec<String> {
        let model = self.schema.model(self.model);
        model
            .constructor
            .iter()
            .filter(|index| !self.mapped.contains(index))
            .map(|index| &model.fields[*index])
            .filter(|field| !field.nullable)
            .map(|field| field.name.to_string())
            .collect()
    }

    fn model_name(&self) -> String {
        self.schema.model(self.model).name.to_string()
    }

    /// Matches runs of words starting at `pos` against the fields of
    /// `model`. With `out` set, resolutions are collected; without it the
    /// search only reports whether one exists.
    fn fields(
        &self,
        model: ModelId,
        tokens: &[Token<'_>],
        pos: usize,
        depth: usize,
        search: &mut Search,
        mut out: Option<&mut Vec<Candidate>>,
    ) -> bool {
        let model = self.schema.model(model);
        let run = word_run(tokens, pos);
        let mut found = false;

        for (index, field) in model.fields.iter().enumerate() {
            for end in pos + 1..=run {
                if !self.matches(&field.name, &tokens[pos..end]) {
                    continue;
                }

                let mut steps = vec![Step::Field(index)];
                found |= self.follow(
                    &field.ty,
                    tokens,
                    end,
                    depth + 1,
                    &mut steps,
                    search,
                    out.as_deref_mut(),
                );

                if found && out.is_none() {
                    return true;
                }
            }
        }

        found
    }

    #[allow(clippy::too_many_arguments)]
    fn follow(
        &self,
        ty: &Type,
        tokens: &[Token<'_>],
        pos: usize,
        depth: usize,
        steps: &mut Vec<Step>,
        search: &mut Search,
        out: Option<&mut Vec<Candidate>>,
    ) -> bool {
        if depth > self.options.max_depth {
            search.depth_exceeded = true;
            return false;
        }

        let Some(token) = tokens.get(pos) else {
            if let Some(out) = out {
                out.push(Candidate {
                    steps: steps.clone(),
                    rest: None,
                });
            }
            return true;
        };

        match (ty, token.kind) {
            (Type::Model(model), TokenKind::Word(_)) => {
                if !self.resolves_in(*model, tokens, pos, depth, search) {
                    return false;
                }
                if let Some(out) = out {
                    out.push(Candidate {
                        steps: steps.clone(),
                        rest: Some(pos),
                    });
                }
                true
            }
            (Type::List(inner), TokenKind::Bracket(index)) => {
                let Ok(index) = index.trim().parse::<usize>() else {
                    return false;
                };
                if index > self.options.max_index {
                    search.index_exceeded = search.index_exceeded.max(Some(index));
                    return false;
                }
                steps.push(Step::Index(index));
                let found = self.follow(inner, tokens, pos + 1, depth + 1, steps, search, out);
                steps.pop();
                found
            }
            (Type::List(inner), TokenKind::Word(_)) if inner.as_model().is_some() => {
                steps.push(Step::Element);
                let found = self.follow(inner, tokens, pos, depth + 1, steps, search, out);
                steps.pop();
                found
            }
            (Type::Map(inner), TokenKind::Word(key) | TokenKind::Bracket(key)) => {
                steps.push(Step::Key(key.to_string()));
                let found = self.follow(inner, tokens, pos + 1, depth + 1, steps, search, out);
                steps.pop();
                found
            }
            _ => false,
        }
    }

    /// Whether `tokens[pos..]` resolves fully inside `model` or one of its
    /// configured variants.
    fn resolves_in(
        &self,
        model: ModelId,
        tokens: &[Token<'_>],
        pos: usize,
        depth: usize,
        search: &mut Search,
    ) -> bool {
        if self.fields(model, tokens, pos, depth, search, None) {
            return true;
        }

        self.options
            .variants
            .get(&model)
            .into_iter()
            .flatten()
            .any(|variant| self.fields(*variant, tokens, pos, depth, search, None))
    }

    fn matches(&self, name: &Name, words: &[Token<'_>]) -> bool {
        name.parts.len() == words.len()
            && name.parts.iter().zip(words).all(|(part, token)| {
                let TokenKind::Word(word) = token.kind else {
                    return false;
                };
                match self.options.case {
                    CaseSensitivity::Sensitive => part == word,
                    CaseSensitivity::Insensitive => part.to_lowercase() == word.to_lowercase(),
                }
            })
    }
}

/// End of the run of words starting at `pos` that stays inside one segment.
fn word_run(tokens: &[Token<'_>], pos: usize) -> usize {
    let mut end = pos;
    while let Some(token) = tokens.get(end) {
        let in_run = matches!(token.kind, TokenKind::Word(_)) && (end == pos || !token.hard);
        if !in_run {
            break;
        }
        end += 1;
    }
    end
}

fn tokenize(name: &str) -> Option<Vec<Token<'_>>> {
    let mut tokens = vec![];
    let mut hard = false;
    let mut offset = 0;

    for segment in name.split('.') {
        let mut rest = segment;
        let mut base = offset;

        while !rest.is_empty() {
            if let Some(inner) = rest.strip_prefix('[') {
                let close = inner.find(']')?;
                tokens.push(Token {
                    kind: TokenKind::Bracket(&inner[..close]),
                    start: base,
                    hard,
                });
                hard = false;

                let consumed = close + 2;
                rest = &rest[consumed..];
                base += consumed;
            } else {
                let len = rest.find('[').unwrap_or(rest.len());
                let words = &rest[..len];

                for (start, end) in split_words(words) {
                    tokens.push(Token {
                        kind: TokenKind::Word(&words[start..end]),
                        start: base + start,
                        hard,
                    });
                    hard = false;
                }

                rest = &rest[len..];
                base += len;
            }
        }

        offset += segment.len() + 1;
        hard = true;
    }

    Some(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(name: &str) -> Vec<String> {
        tokenize(name)
            .unwrap()
            .iter()
            .map(|token| match token.kind {
                TokenKind::Word(word) => word.to_string(),
                TokenKind::Bracket(key) => format!("[{key}]"),
            })
            .collect()
    }

    #[test]
    fn tokenize_separators() {
        assert_eq!(words("address.city"), ["address", "city"]);
        assert_eq!(words("address_city"), ["address", "city"]);
        assert_eq!(words("addressCity"), ["address", "City"]);
        assert_eq!(words("items[2].name"), ["items", "[2]", "name"]);
        assert_eq!(words("labels[en]"), ["labels", "[en]"]);
    }

    #[test]
    fn hard_boundaries() {
        let tokens = tokenize("a_b.c").unwrap();
        let hard: Vec<bool> = tokens.iter().map(|t| t.hard).collect();
        assert_eq!(hard, [false, false, true]);
        assert_eq!(word_run(&tokens, 0), 2);
        assert_eq!(word_run(&tokens, 2), 3);
    }

    #[test]
    fn unbalanced_brackets() {
        assert!(tokenize("items[2").is_none());
    }
}
