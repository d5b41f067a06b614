//! Step handlers: functions taking a [`World`] and typed arguments.
//!
//! [`World`]: crate::World

use std::{
    panic::{self, AssertUnwindSafe},
    sync::Arc,
};

use sealed::sealed;

use crate::error::{HandlerFailure, PanicPayloadExt as _};

use super::param::{Arguments, ConversionFailure, Param, ParamKind};

/// Handler invocation with its arguments already converted.
pub type BoundFn<W> =
    Box<dyn Fn(&mut W) -> Result<(), HandlerFailure> + Send + Sync>;

/// Value a step handler may return.
///
/// Either `()` or a [`Result`] whose error converts into [`anyhow::Error`].
#[sealed]
pub trait StepOutput {
    /// Converts this value into a [`Result`].
    ///
    /// # Errors
    ///
    /// If the handler reported a failure.
    fn into_result(self) -> anyhow::Result<()>;
}

#[sealed]
impl StepOutput for () {
    fn into_result(self) -> anyhow::Result<()> {
        Ok(())
    }
}

#[sealed]
impl<E: Into<anyhow::Error>> StepOutput for Result<(), E> {
    fn into_result(self) -> anyhow::Result<()> {
        self.map_err(Into::into)
    }
}

/// Function usable as a step definition of a `W` [`World`].
///
/// Implemented for every `Fn(&mut W, A1, .., An) -> R` with up to 5 [`Param`]
/// arguments, where `R` is a [`StepOutput`].
///
/// [`World`]: crate::World
pub trait Handler<W, Args>: Send + Sync + 'static {
    /// Declared [`ParamKind`]s of the arguments, in order.
    fn signature() -> Vec<ParamKind>;

    /// Converts the arguments of a matched step and binds them to this
    /// handler.
    ///
    /// # Errors
    ///
    /// If any of the arguments cannot be converted.
    fn bind(
        self: Arc<Self>,
        args: &mut Arguments<'_>,
    ) -> Result<BoundFn<W>, ConversionFailure>;
}

/// Calls the `step`, turning both a returned error and a panic into a
/// [`HandlerFailure`].
pub(crate) fn invoke<R: StepOutput>(
    step: impl FnOnce() -> R,
) -> Result<(), HandlerFailure> {
    match panic::catch_unwind(AssertUnwindSafe(step)) {
        Ok(out) => out
            .into_result()
            .map_err(|e| HandlerFailure::Returned(Arc::new(e))),
        Err(payload) => Err(HandlerFailure::Panicked(payload.describe())),
    }
}

macro_rules! impl_handler {
    ($($arg:ident),*) => {
        impl<W, F, R, $($arg),*> Handler<W, ($($arg,)*)> for F
        where
            W: 'static,
            F: Fn(&mut W, $($arg),*) -> R + Send + Sync + 'static,
            R: StepOutput,
            $($arg: Param,)*
        {
            fn signature() -> Vec<ParamKind> {
                vec![$(<$arg as Param>::KIND),*]
            }

            #[allow(non_snake_case, unused_variables)]
            fn bind(
                self: Arc<Self>,
                args: &mut Arguments<'_>,
            ) -> Result<BoundFn<W>, ConversionFailure> {
                $(let $arg = args.next::<$arg>()?;)*
                Ok(Box::new(move |world: &mut W| {
                    invoke(|| (self)(world, $($arg.clone()),*))
                }))
            }
        }
    };
}

impl_handler!();
impl_handler!(A1);
impl_handler!(A1, A2);
impl_handler!(A1, A2, A3);
impl_handler!(A1, A2, A3, A4);
impl_handler!(A1, A2, A3, A4, A5);

#[cfg(test)]
mod tests {
    use crate::Table;

    use super::*;

    #[derive(Default)]
    struct Board {
        marks: Vec<String>,
    }

    fn bind<Args, H: Handler<Board, Args>>(
        handler: H,
        captures: &[&str],
        table: Option<&Table>,
    ) -> Result<BoundFn<Board>, ConversionFailure> {
        let captures = captures.iter().map(|&c| c.to_owned()).collect::<Vec<_>>();
        Arc::new(handler).bind(&mut Arguments::new(&captures, table))
    }

    fn mark(board: &mut Board, mark: String, row: u8) {
        board.marks.push(format!("{mark}{row}"));
    }

    #[test]
    fn signature_lists_params() {
        assert_eq!(
            <fn(&mut Board, String, u8) as Handler<Board, (String, u8)>>::signature(),
            [ParamKind::String, ParamKind::Integer],
        );
    }

    #[test]
    fn bound_handler_is_reusable() {
        let step = bind(mark, &["X", "2"], None).unwrap();
        let mut board = Board::default();

        step(&mut board).unwrap();
        step(&mut board).unwrap();

        assert_eq!(board.marks, ["X2", "X2"]);
    }

    #[test]
    fn conversion_fails_at_bind_time() {
        let err = bind(mark, &["X", "two"], None).err().unwrap();

        assert_eq!(err.position, 1);
        assert_eq!(err.expected, ParamKind::Integer);
    }

    #[test]
    fn returned_error_is_a_failure() {
        let step = bind(
            |_: &mut Board| -> anyhow::Result<()> { anyhow::bail!("sold out") },
            &[],
            None,
        )
        .unwrap();

        let err = step(&mut Board::default()).unwrap_err();
        assert!(matches!(&err, HandlerFailure::Returned(e) if e.to_string() == "sold out"));
    }

    #[test]
    fn panic_is_a_failure() {
        let step = bind(
            |b: &mut Board, n: usize| assert_eq!(b.marks.len(), n, "marks"),
            &["5"],
            None,
        )
        .unwrap();

        let err = step(&mut Board::default()).unwrap_err();
        let msg = match err {
            HandlerFailure::Panicked(msg) => msg,
            other => panic!("expected panic, got: {other}"),
        };
        assert!(msg.contains("marks"), "{msg}");
    }

    #[test]
    fn table_argument() {
        let table = Table::try_from(vec![vec!["mark"], vec!["O"]]).unwrap();
        let step = bind(
            |b: &mut Board, t: Table| {
                b.marks.extend(t.rows().filter_map(|r| r.get("mark")).map(str::to_owned));
            },
            &[],
            Some(&table),
        )
        .unwrap();

        let mut board = Board::default();
        step(&mut board).unwrap();
        assert_eq!(board.marks, ["O"]);
    }
}
