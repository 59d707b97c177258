// Concrete collaborators behind the domain ports: the IR document parser and the rule validator.

pub mod document;
pub mod type_syntax;
pub mod validator;

pub use document::IrDocumentParser;
pub use validator::RuleValidator;
