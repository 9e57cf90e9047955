/// Declares a struct as an envelope type.
///
/// `tagged!(Foo => "pkg.Foo")` names the type explicitly; `tagged!(Foo)` names it after its
/// module path, e.g. `my_crate::models::Foo`. The struct must derive `Serialize`,
/// `Deserialize`, `Clone`, `PartialEq` and `Debug`.
///
/// # Examples
///
/// ```rust
/// use serde::{Deserialize, Serialize};
/// use serde_envelope::Tagged;
///
/// #[derive(Serialize, Deserialize, Clone, PartialEq, Debug)]
/// struct Order { id: u64 }
/// serde_envelope::tagged!(Order => "shop.Order");
///
/// #[derive(Serialize, Deserialize, Clone, PartialEq, Debug)]
/// struct Receipt { id: u64 }
/// serde_envelope::tagged!(Receipt);
///
/// assert_eq!(Order::shape().to_string(), "shop.Order");
/// assert!(Receipt::shape().to_string().ends_with("::Receipt"));
/// ```
#[macro_export]
macro_rules! tagged {
    ($ty:ident) => {
        $crate::tagged!($ty => concat!(module_path!(), "::", stringify!($ty)));
    };

    ($ty:ty => $name:expr) => {
        impl $crate::Tagged for $ty {
            fn shape() -> $crate::Shape {
                $crate::Shape::structure($name)
            }
        }
    };
}
