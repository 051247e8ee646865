//! Declaration AST
//!
//! Only what can appear in a declaration file is modelled: there are no
//! statements or expressions beyond literal initialisers.

#[derive(Debug, Clone, PartialEq)]
pub struct SourceFile {
    /// Raw `/// <reference ... />` directives, in source order
    pub directives: Vec<String>,
    pub items: Vec<Item>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    /// Raw text of the doc comment directly preceding the item
    pub doc: Option<String>,
    pub exported: bool,
    pub default: bool,
    pub kind: ItemKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ItemKind {
    /// `declare module "name" { ... }`
    Module { name: String, body: Vec<Item> },
    /// `namespace A.B { ... }` or `declare module A { ... }`
    Namespace { path: Vec<String>, body: Vec<Item> },
    /// `declare global { ... }`
    Global(Vec<Item>),
    Import(ImportDecl),
    /// `import x = require("m")` or `import x = A.B`
    ImportEquals { name: String, target: ImportTarget },
    Export(ExportDecl),
    /// `export default <expression>;`
    ExportDefault(Vec<String>),
    /// `export = <expression>;`
    ExportAssignment(Vec<String>),
    /// `export as namespace Name;`
    ExportAsNamespace(String),
    Interface(InterfaceDecl),
    TypeAlias(TypeAliasDecl),
    Function(FunctionDecl),
    Class(ClassDecl),
    Enum(EnumDecl),
    Variable(VariableDecl),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ImportTarget {
    Require(String),
    Entity(Vec<String>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImportDecl {
    pub type_only: bool,
    pub default: Option<String>,
    pub namespace: Option<String>,
    pub named: Vec<ImportSpecifier>,
    pub source: String,
}

impl ImportDecl {
    /// `import "m";`
    pub fn is_side_effect(&self) -> bool {
        self.default.is_none() && self.namespace.is_none() && self.named.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImportSpecifier {
    pub name: String,
    pub alias: Option<String>,
    pub type_only: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExportDecl {
    /// `export { a, b as c } [from "m"];`
    Named {
        type_only: bool,
        specifiers: Vec<ExportSpecifier>,
        source: Option<String>,
    },
    /// `export * [as ns] from "m";`
    All { alias: Option<String>, source: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExportSpecifier {
    pub name: String,
    pub alias: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeParam {
    pub name: String,
    pub constraint: Option<Type>,
    pub default: Option<Type>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InterfaceDecl {
    pub name: String,
    pub type_params: Vec<TypeParam>,
    pub extends: Vec<Type>,
    pub members: Vec<Member>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeAliasDecl {
    pub name: String,
    pub type_params: Vec<TypeParam>,
    pub ty: Type,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDecl {
    pub name: Option<String>,
    pub signature: Signature,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassDecl {
    pub name: Option<String>,
    pub is_abstract: bool,
    pub type_params: Vec<TypeParam>,
    pub extends: Option<Type>,
    pub implements: Vec<Type>,
    pub members: Vec<Member>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumDecl {
    pub name: String,
    pub is_const: bool,
    pub members: Vec<EnumMember>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumMember {
    pub doc: Option<String>,
    pub name: String,
    pub value: Option<Literal>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarKind {
    Var,
    Let,
    Const,
}

impl VarKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            VarKind::Var => "var",
            VarKind::Let => "let",
            VarKind::Const => "const",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct VariableDecl {
    pub kind: VarKind,
    pub declarators: Vec<Declarator>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Declarator {
    pub name: String,
    pub ty: Option<Type>,
    /// Literal initialiser (`export declare const x = 1;`)
    pub init: Option<Literal>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Str(String),
    /// Numeric literal text, sign included
    Number(String),
    BigInt(String),
    Bool(bool),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Signature {
    pub type_params: Vec<TypeParam>,
    pub params: Vec<Param>,
    pub ret: Option<Box<Type>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    /// `None` for destructuring patterns
    pub name: Option<String>,
    pub optional: bool,
    pub rest: bool,
    pub ty: Option<Type>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Accessibility {
    #[default]
    Public,
    Protected,
    Private,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    pub accessibility: Accessibility,
    pub is_static: bool,
    pub readonly: bool,
    pub is_abstract: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PropName {
    Ident(String),
    Str(String),
    Number(String),
    /// `[expr]`, stored as the dotted path of the expression
    Computed(Vec<String>),
}

impl PropName {
    pub fn is_private_name(&self) -> bool {
        matches!(self, PropName::Ident(name) if name.starts_with('#'))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Member {
    pub doc: Option<String>,
    pub modifiers: Modifiers,
    pub kind: MemberKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MemberKind {
    Property {
        name: PropName,
        optional: bool,
        ty: Option<Type>,
    },
    Method {
        name: PropName,
        optional: bool,
        signature: Signature,
    },
    Call(Signature),
    Construct(Signature),
    Index {
        param: String,
        key: Type,
        value: Type,
    },
    Getter {
        name: PropName,
        ty: Option<Type>,
    },
    Setter {
        name: PropName,
        ty: Option<Type>,
    },
    Constructor(Vec<Param>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    Any,
    Unknown,
    Never,
    Void,
    Undefined,
    Null,
    String,
    Number,
    Boolean,
    BigInt,
    Symbol,
    Object,
    This,
}

impl Keyword {
    pub fn from_ident(ident: &str) -> Option<Self> {
        Some(match ident {
            "any" => Keyword::Any,
            "unknown" => Keyword::Unknown,
            "never" => Keyword::Never,
            "void" => Keyword::Void,
            "undefined" => Keyword::Undefined,
            "null" => Keyword::Null,
            "string" => Keyword::String,
            "number" => Keyword::Number,
            "boolean" => Keyword::Boolean,
            "bigint" => Keyword::BigInt,
            "symbol" => Keyword::Symbol,
            "object" => Keyword::Object,
            "this" => Keyword::This,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeOperator {
    Keyof,
    Unique,
    Readonly,
}

/// `+`/`-` modifiers of mapped types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MappedModifier {
    Add,
    Remove,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TupleElement {
    pub label: Option<String>,
    pub optional: bool,
    pub rest: bool,
    pub ty: Type,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Type {
    Keyword(Keyword),
    Reference {
        name: Vec<String>,
        args: Vec<Type>,
    },
    Literal(Literal),
    Template,
    Array(Box<Type>),
    Tuple(Vec<TupleElement>),
    Union(Vec<Type>),
    Intersection(Vec<Type>),
    Function(Signature),
    Constructor {
        is_abstract: bool,
        signature: Signature,
    },
    Object(Vec<Member>),
    Operator {
        op: TypeOperator,
        ty: Box<Type>,
    },
    Query {
        name: Vec<String>,
        args: Vec<Type>,
    },
    Import {
        is_typeof: bool,
        module: String,
        qualifier: Vec<String>,
        args: Vec<Type>,
    },
    IndexedAccess {
        object: Box<Type>,
        index: Box<Type>,
    },
    Conditional {
        check: Box<Type>,
        extends: Box<Type>,
        then: Box<Type>,
        otherwise: Box<Type>,
    },
    Infer {
        name: String,
        constraint: Option<Box<Type>>,
    },
    Mapped {
        readonly: Option<MappedModifier>,
        param: String,
        constraint: Box<Type>,
        optional: Option<MappedModifier>,
        value: Option<Box<Type>>,
    },
    /// `x is T`, `asserts x`, `asserts x is T`
    Predicate {
        asserts: bool,
        param: String,
        ty: Option<Box<Type>>,
    },
    Paren(Box<Type>),
}
