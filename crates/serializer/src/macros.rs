//! Declarative field lists

/// Implement [`Serializable`](crate::Serializable) from an ordered field list
///
/// Each entry names a field and the session accessor used for it. An
/// optional `if` predicate receives the session [`Revision`](craftkit_core::Revision)
/// and gates the field on the format version. `alloc` computes the
/// encoded-size upper bound from the value.
///
/// ```ignore
/// serializable_fields! {
///     FloatVariable {
///         value: f32,
///         min: f32 if |rev: Revision| rev.head() >= 0x300,
///     }
///     alloc = |_this| 8
/// }
/// ```
#[macro_export]
macro_rules! serializable_fields {
    (
        $ty:ty {
            $( $field:ident : $accessor:ident $( if $pred:expr )? ),* $(,)?
        }
        alloc = |$this:ident| $alloc:expr
    ) => {
        impl $crate::Serializable for $ty {
            fn serialize(&mut self, serializer: &mut $crate::Serializer) -> $crate::Result<()> {
                $(
                    $crate::serializable_fields!(@field self, serializer, $field, $accessor $(, $pred)?);
                )*
                Ok(())
            }

            fn allocation_size(&self) -> usize {
                let $this = self;
                $alloc
            }
        }
    };
    (@field $self:ident, $s:ident, $field:ident, $accessor:ident) => {
        $s.$accessor(&mut $self.$field)?;
    };
    (@field $self:ident, $s:ident, $field:ident, $accessor:ident, $pred:expr) => {
        if ($pred)($s.revision()) {
            $s.$accessor(&mut $self.$field)?;
        }
    };
}
