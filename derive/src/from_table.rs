use proc_macro::TokenStream;
use quote::quote;
use syn::{
    Attribute, Data, DeriveInput, Error, Field, Fields, GenericArgument, Ident, PathArguments,
    Result, Type,
    parse::{Parse, ParseStream},
};

pub(crate) fn expand_from_table(input: &DeriveInput) -> Result<TokenStream> {
    let Data::Struct(data) = &input.data else {
        Err(Error::new_spanned(
            input,
            "`FromTable` may only be derived on structs.",
        ))?
    };

    let Fields::Named(fields) = &data.fields else {
        Err(Error::new_spanned(
            input,
            "`FromTable` may only be derived on structs with named fields.",
        ))?
    };

    let mut header = None;
    let mut records = None;

    for field in &fields.named {
        match FieldMetadata::parse(field)? {
            Some(FieldMetadata::Header { name, ty }) => {
                if header.replace((name, ty)).is_some() {
                    Err(Error::new_spanned(
                        field,
                        "Only one field may receive the header.",
                    ))?
                }
            }
            Some(FieldMetadata::Records { name, active }) => {
                if records.replace((name, active)).is_some() {
                    Err(Error::new_spanned(
                        field,
                        "Only one field may receive records.",
                    ))?
                }
            }
            None => {} // Skip fields without an attribute.
        }
    }

    let header_method = header.map(|(name, ty)| {
        quote! {
            fn add_header(&mut self, header: &#ty) {
                self.#name = Some(header.clone());
            }
        }
    });

    let body = match records {
        Some((name, active)) => {
            let filter = active.then(|| quote! { if _deleted { return None; } });

            quote! {
                #filter
                self.#name.push(Default::default());
                self.#name.last_mut().map(|r| r as _)
            }
        }
        None => quote! { None },
    };

    let name = &input.ident;

    let expanded = quote! {
        impl FromTable for #name {
            #header_method

            fn add_record(&mut self, _sequence: u32, _deleted: bool) -> Option<&mut dyn FromRecord> {
                #body
            }
        }
    };

    Ok(expanded.into())
}

#[derive(Debug)]
enum FieldMetadata {
    /// An `Option<Header>` member.
    Header { name: Ident, ty: Type },
    /// A `Vec<T>` member, optionally skipping deleted records.
    Records { name: Ident, active: bool },
}

impl FieldMetadata {
    fn parse(field: &Field) -> Result<Option<Self>> {
        let Some(name) = field.ident.clone() else {
            Err(Error::new_spanned(field, "Field must be named."))?
        };

        let header = field.attrs.iter().find(|a| a.path().is_ident("header"));
        let records = field.attrs.iter().find(|a| a.path().is_ident("records"));

        match (header, records) {
            (Some(_), Some(_)) => Err(Error::new_spanned(
                field,
                "Field may not receive both the header and records.",
            )),
            (Some(attr), None) => {
                attr.meta.require_path_only()?;
                let ty = generic_argument(&field.ty, "Option")?;
                Ok(Some(Self::Header { name, ty }))
            }
            (None, Some(attr)) => {
                let RecordsAttribute { active } = RecordsAttribute::from_attribute(attr)?;
                generic_argument(&field.ty, "Vec")?;
                Ok(Some(Self::Records { name, active }))
            }
            (None, None) => Ok(None),
        }
    }
}

/// Extract `T` from a member of type `Wrapper<T>`.
fn generic_argument(ty: &Type, wrapper: &str) -> Result<Type> {
    let message = format!("Field must have a `{wrapper}<T>` type.");

    let Type::Path(path) = ty else {
        Err(Error::new_spanned(ty, &message))?
    };

    let Some(segment) = path.path.segments.last() else {
        Err(Error::new_spanned(&path.path.segments, &message))?
    };

    if segment.ident != wrapper {
        Err(Error::new_spanned(&segment.ident, &message))?
    }

    let PathArguments::AngleBracketed(arguments) = &segment.arguments else {
        Err(Error::new_spanned(&segment.arguments, &message))?
    };

    let Some(GenericArgument::Type(inner_type)) = arguments.args.first() else {
        Err(Error::new_spanned(&arguments.args, &message))?
    };

    Ok(inner_type.clone())
}

#[derive(Debug)]
struct RecordsAttribute {
    active: bool,
}

impl RecordsAttribute {
    fn from_attribute(attr: &Attribute) -> Result<Self> {
        if attr.meta.require_path_only().is_ok() {
            Ok(Self { active: false })
        } else {
            attr.meta.require_list()?.parse_args()
        }
    }
}

impl Parse for RecordsAttribute {
    fn parse(input: ParseStream) -> Result<Self> {
        let ident = input.parse::<Ident>()?;

        if ident != "active" {
            Err(Error::new_spanned(
                ident,
                "Records filter must be `active`.",
            ))?
        }

        Ok(Self { active: true })
    }
}
