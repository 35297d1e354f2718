mod structures;

use proc_macro::TokenStream;
use quote::quote;
use structures::ErrorKindTarget;
use syn::parse_macro_input;

/// Derives the [`ErrorKind`] trait for the given struct.
///
/// This trait can be derived for any kind of struct.
///
/// The information of the error can be customized using the `error` attribute by adding the
/// corresponding tags to it:
/// ```
/// use cas_attrs::ErrorKind;
///
/// #[derive(Debug, ErrorKind)]
/// #[error(message = "division by zero", labels = ["this expression"])]
/// pub struct DivideByZero;
///
/// #[derive(Debug, ErrorKind)]
/// #[error(fatal, message = "operand stack overflow", labels = ["while evaluating this"])]
/// pub struct StackOverflow;
/// ```
///
/// The following tags are available:
///
/// | Tag         | Description                                                                  |
/// | ----------- | ---------------------------------------------------------------------------- |
/// | `message`   | The message displayed at the top of the error when it is displayed.          |
/// | `labels`    | The text of the labels that point to each span of the error.                 |
/// | `help`      | Optional help text for the error, describing what the user can do to fix it. |
/// | `fatal`     | Flag (no value). Marks the error as an internal, unrecoverable error.        |
///
/// Each valued tag accepts an expression that should evaluate to a [`String`] (or, for `labels`,
/// an iterable of strings). The expression is evaluated with `self` in scope, and for structs
/// with named fields, with the members of the struct in scope as well.
///
/// [`ErrorKind`]: https://docs.rs/cas-error
#[proc_macro_derive(ErrorKind, attributes(error))]
pub fn error_kind(item: TokenStream) -> TokenStream {
    let target = parse_macro_input!(item as ErrorKindTarget);
    let name = &target.name;
    quote! {
        impl cas_error::ErrorKind for #name {
            fn as_any(&self) -> &dyn std::any::Any {
                self
            }
            #target
        }
    }.into()
}
