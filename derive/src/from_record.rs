use std::collections::HashMap;

use proc_macro::{Span, TokenStream};
use quote::{format_ident, quote};
use syn::{
    Data, DeriveInput, Error, ExprClosure, Field, Fields, GenericArgument, Ident, LitStr, Pat,
    PathArguments, Result, Token, Type,
    parse::{Parse, ParseStream},
    spanned::Spanned,
};

pub(crate) fn expand_from_record(input: &DeriveInput) -> Result<TokenStream> {
    let Data::Struct(data) = &input.data else {
        Err(Error::new(
            input.span(),
            "`FromRecord` may only be derived on structs.",
        ))?
    };

    let Fields::Named(fields) = &data.fields else {
        Err(Error::new(
            input.span(),
            "`FromRecord` may only be derived on structs with named fields.",
        ))?
    };

    let fields = fields
        .named
        .iter()
        .map(FieldMetadata::parse)
        .map(Result::transpose)
        .flatten() // Skip fields without an attribute.
        .collect::<Result<Vec<_>>>()?;

    type Case = (Ident, Option<(Type, ExprClosure)>);
    let mut value_methods: HashMap<Primitive, HashMap<String, (LitStr, Case)>> = HashMap::new();
    let mut deleted_method: Option<Case> = None;
    let mut sequence_method: Option<Case> = None;

    for field in fields {
        let assignment = (field.name, field.handler);

        let existing = match field.identifier {
            FieldIdentifier::Name(name) => {
                let primitive = Primitive::of(&field.primitive)?;

                value_methods
                    .entry(primitive)
                    .or_default()
                    .insert(name.value(), (name, assignment))
                    .map(|_| ())
            }
            FieldIdentifier::Deleted => deleted_method.replace(assignment).map(|_| ()),
            FieldIdentifier::Sequence => sequence_method.replace(assignment).map(|_| ()),
        };

        if existing.is_some() {
            Err(Error::new(
                field.span.into(),
                "Field identifiers must be unique.",
            ))?
        }
    }

    let value_methods = value_methods.into_iter().map(|(primitive, fields)| {
        let cases = fields.into_values().map(|(name, (member, handler))| {
            let assignment = assign(&member, handler);
            quote! { #name => { #assignment } }
        });

        let (method, ty) = primitive.method();

        quote! {
            fn #method(&mut self, field: &str, value: #ty) {
                match field {
                    #(#cases)*
                    _ => {}
                };
            }
        }
    });

    let deleted_method = deleted_method.map(|(member, handler)| {
        let assignment = assign(&member, handler);

        quote! {
            fn add_deleted(&mut self, value: bool) {
                #assignment;
            }
        }
    });

    let sequence_method = sequence_method.map(|(member, handler)| {
        let assignment = assign(&member, handler);

        quote! {
            fn add_sequence(&mut self, value: u32) {
                #assignment;
            }
        }
    });

    let name = &input.ident;

    let expanded = quote! {
        impl FromRecord for #name {
            #(#value_methods)*
            #deleted_method
            #sequence_method
        }
    };

    Ok(expanded.into())
}

/// Store `value` in a struct member, through its accumulator if one was given.
fn assign(member: &Ident, handler: Option<(Type, ExprClosure)>) -> proc_macro2::TokenStream {
    if let Some((field_type, handler)) = handler {
        let body = handler.body;
        let acc = &handler.inputs[0];
        let val = &handler.inputs[1];

        quote! {
            (|#acc: &mut #field_type, #val| #body)(&mut self.#member, value)
        }
    } else {
        quote! {
            self.#member = Some(value)
        }
    }
}

/// Value types published by `FromRecord`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Primitive {
    String,
    F64,
    Bool,
}

impl Primitive {
    fn of(ty: &Type) -> Result<Self> {
        let ident = match ty {
            Type::Path(path) => path.path.segments.last().map(|s| &s.ident),
            _ => None,
        };

        match ident {
            Some(ident) if ident == "String" => Ok(Self::String),
            Some(ident) if ident == "f64" => Ok(Self::F64),
            Some(ident) if ident == "bool" => Ok(Self::Bool),
            _ => Err(Error::new_spanned(
                ty,
                "Field values must be received as `String`, `f64` or `bool`.",
            )),
        }
    }

    fn method(self) -> (Ident, proc_macro2::TokenStream) {
        match self {
            Self::String => (format_ident!("add_string"), quote! { String }),
            Self::F64 => (format_ident!("add_f64"), quote! { f64 }),
            Self::Bool => (format_ident!("add_bool"), quote! { bool }),
        }
    }
}

#[derive(Debug)]
struct FieldMetadata {
    name: Ident,
    primitive: Type,
    identifier: FieldIdentifier,
    handler: Option<(Type, ExprClosure)>,
    span: Span,
}

#[derive(Debug)]
enum FieldIdentifier {
    Name(LitStr),
    Deleted,
    Sequence,
}

impl FieldMetadata {
    fn parse(field: &Field) -> Result<Option<Self>> {
        let Some(name) = field.ident.clone() else {
            Err(Error::new_spanned(field, "Field must be named."))?
        };

        let Some(attr) = field.attrs.iter().find(|a| a.path().is_ident("field")) else {
            return Ok(None);
        };

        let span = attr.span().unwrap();

        let FieldAttribute {
            identifier,
            handler,
        } = attr.meta.require_list()?.parse_args()?;

        let primitive = if let Some(handler) = &handler {
            if handler.inputs.len() != 2 {
                Err(Error::new_spanned(
                    handler,
                    "Handler closure must have two parameters.",
                ))?
            }

            let parameter = &handler.inputs[1];

            let Pat::Type(pat_type) = parameter else {
                Err(Error::new_spanned(
                    parameter,
                    "Handler closure's second parameter must be annotated with the expected value type.",
                ))?
            };

            (*pat_type.ty).clone()
        } else {
            option_inner(&field.ty)?
        };

        let handler = handler.map(|h| (field.ty.clone(), h));

        Ok(Some(Self {
            name,
            primitive,
            identifier,
            handler,
            span,
        }))
    }
}

/// Extract `T` from a member of type `Option<T>`.
fn option_inner(ty: &Type) -> Result<Type> {
    let Type::Path(path) = ty else {
        Err(Error::new_spanned(ty, "Field must have a type annotation."))?
    };

    let Some(segment) = path.path.segments.last() else {
        Err(Error::new_spanned(
            &path.path.segments,
            "Field must have a type annotation.",
        ))?
    };

    if segment.ident != "Option" {
        Err(Error::new_spanned(
            &segment.ident,
            "Field without a handler must have type `Option<T>`.",
        ))?
    }

    let PathArguments::AngleBracketed(arguments) = &segment.arguments else {
        Err(Error::new_spanned(
            &segment.arguments,
            "Field of type `Option<T>` must have a generic parameter.",
        ))?
    };

    let Some(GenericArgument::Type(inner_type)) = arguments.args.first() else {
        Err(Error::new_spanned(
            &arguments.args,
            "Generic argument of a field of type `Option<T>` must be a type.",
        ))?
    };

    Ok(inner_type.clone())
}

#[derive(Debug)]
struct FieldAttribute {
    identifier: FieldIdentifier,
    handler: Option<ExprClosure>,
}

impl Parse for FieldAttribute {
    fn parse(input: ParseStream) -> Result<Self> {
        let identifier = if let Ok(ident) = input.parse::<Ident>() {
            if ident == "deleted" {
                FieldIdentifier::Deleted
            } else if ident == "sequence" {
                FieldIdentifier::Sequence
            } else {
                Err(Error::new_spanned(
                    ident,
                    "Field identifier must be a string literal, `deleted` or `sequence`.",
                ))?
            }
        } else {
            FieldIdentifier::Name(input.parse::<LitStr>()?)
        };

        let handler = if !input.is_empty() {
            input.parse::<Token![,]>()?;
            Some(input.parse::<ExprClosure>()?)
        } else {
            None
        };

        Ok(Self {
            identifier,
            handler,
        })
    }
}
