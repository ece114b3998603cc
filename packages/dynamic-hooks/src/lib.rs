#![deny(clippy::all)]

/**
 * Dynamic Hooks
 *
 * Finds component hooks in text and DOM content, replaces them with anchors and
 * keeps the bindings of the mounted components in sync with a context value.
 */

// Core modules
pub mod bindings;
pub mod chars;
pub mod component;
pub mod diagnostics;
pub mod dom;
pub mod error;
pub mod expression;
pub mod guard;
pub mod hooks;
pub mod options;
pub mod parsers;
pub mod session;
mod util;
pub mod value;

pub use bindings::{BindingDescriptor, DomEvent, HookBindings, PreviousHookBindings};
pub use component::{
    ComponentDefinition, ComponentHost, ComponentRegistry, ComponentSource, InputChange,
    InputDeclaration, InstanceHandle, LazyComponent, LazyResolver, LazyStatus, MountRequest,
    OutputCallback, OutputDeclaration, PassthroughSanitizer, Sanitizer, SubscriptionHandle,
};
pub use diagnostics::{Diagnostic, DiagnosticLevel, Diagnostics};
pub use dom::{Document, NodeId};
pub use error::{ConfigError, ExpressionError, HooksError, Result};
pub use guard::{ParsingGuard, ParsingRegistry};
pub use hooks::HookPosition;
pub use options::ParseOptions;
pub use parsers::{
    HookParser, HookValue, LoadedComponent, ParserCapabilities, ParserEntry, RawBindings,
    SelectorParserConfig,
};
pub use session::{
    Hook, HookEvent, HookIndex, MountState, ParseResult, ParseSession, RefreshResult,
    RefreshTrigger,
};
pub use value::Value;
