//! Message and term tables for one locale

use std::collections::HashMap;
use std::collections::hash_map::Entry as MapEntry;
use std::fmt;

use tracing::{debug, trace};
use unic_langid::LanguageIdentifier;

use super::errors::{BundleError, EntryKind, ResolverError};
use super::functions::{Arity, FunctionRegistry, NamedArguments};
use super::plural::{CldrPluralRules, PluralRules};
use super::resolver::{EntryLookup, Resolver, ResolverOptions};
use super::value::{Arguments, Value};
use crate::config::FtlConfig;
use crate::error::FtlError;
use crate::syntax::ast::{Entry, Message, Resource, Term};

/// Formats messages of one locale.
///
/// Reads need only `&self`, so a bundle can be shared between threads once
/// it is populated.
///
/// ```rust
/// use ftl_core::runtime::{Arguments, Bundle};
/// use ftl_core::syntax::parse;
///
/// let mut bundle = Bundle::new("en-US".parse().unwrap());
/// bundle.add_resource(&parse("greet = Hello, { $name }!")).unwrap();
///
/// let args = Arguments::new().set("name", "Ana");
/// let (text, errors) = bundle.format_message("greet", Some(&args), None);
/// assert_eq!(text, "Hello, Ana!");
/// assert!(errors.is_empty());
/// ```
pub struct Bundle {
    locale: LanguageIdentifier,
    messages: HashMap<String, Message>,
    terms: HashMap<String, Term>,
    functions: FunctionRegistry,
    plurals: Box<dyn PluralRules>,
    options: ResolverOptions,
}

impl fmt::Debug for Bundle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bundle")
            .field("locale", &self.locale.to_string())
            .field("messages", &self.messages.len())
            .field("terms", &self.terms.len())
            .field("functions", &self.functions)
            .field("options", &self.options)
            .finish()
    }
}

impl Bundle {
    pub fn new(locale: LanguageIdentifier) -> Self {
        Self::with_options(locale, ResolverOptions::default())
    }

    pub fn with_options(locale: LanguageIdentifier, options: ResolverOptions) -> Self {
        Self {
            locale,
            messages: HashMap::new(),
            terms: HashMap::new(),
            functions: FunctionRegistry::with_builtins(),
            plurals: Box::new(CldrPluralRules::new()),
            options,
        }
    }

    /// Bundle for the configured locale and resolver options.
    pub fn from_config(config: &FtlConfig) -> Result<Self, FtlError> {
        let locale = config.locale()?;
        Ok(Self::with_options(locale, config.resolver_options()))
    }

    /// Replace the plural oracle.
    pub fn with_plural_rules(self, plurals: impl PluralRules + 'static) -> Self {
        Self {
            plurals: Box::new(plurals),
            ..self
        }
    }

    pub fn locale(&self) -> &LanguageIdentifier {
        &self.locale
    }

    pub fn options(&self) -> &ResolverOptions {
        &self.options
    }

    pub fn set_use_isolating(&mut self, use_isolating: bool) {
        self.options.use_isolating = use_isolating;
    }

    /// Register a function callable from messages.
    pub fn add_function<F>(&mut self, name: impl Into<String>, arity: Arity, function: F)
    where
        F: Fn(&[Value], &NamedArguments) -> Result<Value, String> + Send + Sync + 'static,
    {
        self.functions.register(name, arity, function);
    }

    pub fn functions_mut(&mut self) -> &mut FunctionRegistry {
        &mut self.functions
    }

    /// Add the messages and terms of `resource`. An identifier that is
    /// already defined keeps its first definition and yields an error; all
    /// other entries are still added.
    pub fn add_resource(&mut self, resource: &Resource) -> Result<(), Vec<BundleError>> {
        let mut errors = Vec::new();
        for entry in &resource.body {
            match entry {
                Entry::Message(message) => match self.messages.entry(message.id.name.clone()) {
                    MapEntry::Occupied(_) => errors.push(BundleError::Overriding {
                        kind: EntryKind::Message,
                        id: message.id.name.clone(),
                    }),
                    MapEntry::Vacant(slot) => {
                        slot.insert(message.clone());
                    }
                },
                Entry::Term(term) => match self.terms.entry(term.id.name.clone()) {
                    MapEntry::Occupied(_) => errors.push(BundleError::Overriding {
                        kind: EntryKind::Term,
                        id: term.id.name.clone(),
                    }),
                    MapEntry::Vacant(slot) => {
                        slot.insert(term.clone());
                    }
                },
                Entry::Comment(_) | Entry::Junk(_) => {}
            }
        }

        trace!(
            "Bundle {} now holds {} messages and {} terms",
            self.locale,
            self.messages.len(),
            self.terms.len()
        );
        if errors.is_empty() {
            Ok(())
        } else {
            debug!("{} duplicate entries were not added", errors.len());
            Err(errors)
        }
    }

    /// Add `resource`, replacing entries that are already defined.
    pub fn add_resource_overriding(&mut self, resource: &Resource) {
        for entry in &resource.body {
            match entry {
                Entry::Message(message) => {
                    if self
                        .messages
                        .insert(message.id.name.clone(), message.clone())
                        .is_some()
                    {
                        debug!("Overriding message `{}`", message.id.name);
                    }
                }
                Entry::Term(term) => {
                    if self.terms.insert(term.id.name.clone(), term.clone()).is_some() {
                        debug!("Overriding term `-{}`", term.id.name);
                    }
                }
                Entry::Comment(_) | Entry::Junk(_) => {}
            }
        }
    }

    pub fn has_message(&self, id: &str) -> bool {
        self.messages.contains_key(id)
    }

    pub fn get_message(&self, id: &str) -> Option<&Message> {
        self.messages.get(id)
    }

    pub fn get_term(&self, id: &str) -> Option<&Term> {
        self.terms.get(id)
    }

    pub fn resolver(&self) -> Resolver<'_> {
        Resolver::new(
            self,
            &self.functions,
            self.plurals.as_ref(),
            &self.locale,
            self.options,
        )
    }

    /// Format message `id`, or its `attribute`.
    pub fn format_message(
        &self,
        id: &str,
        args: Option<&Arguments>,
        attribute: Option<&str>,
    ) -> (String, Vec<ResolverError>) {
        match self.messages.get(id) {
            Some(message) => self.resolver().resolve(message, args, attribute),
            None => {
                debug!("Formatting unknown message `{}`", id);
                let placeholder = match attribute {
                    Some(attribute) => format!("{{{id}.{attribute}}}"),
                    None => format!("{{{id}}}"),
                };
                (
                    placeholder,
                    vec![ResolverError::UnknownMessage { id: id.to_string() }],
                )
            }
        }
    }
}

impl EntryLookup for Bundle {
    fn message(&self, id: &str) -> Option<&Message> {
        self.messages.get(id)
    }

    fn term(&self, id: &str) -> Option<&Term> {
        self.terms.get(id)
    }
}
