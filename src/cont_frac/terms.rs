use ndarray::{ArrayD, IxDyn, Zip};
use crate::error::ContinuedFractionError;
use crate::traits::{Element, TermGenerator};

/// Compute the output shape of broadcasting two shapes together (numpy rules).
/// Returns None if the shapes are incompatible.
pub(crate) fn broadcast_shape(a: &[usize], b: &[usize]) -> Option<Vec<usize>> {
    let ndim = a.len().max(b.len());
    let mut result = Vec::with_capacity(ndim);

    // align from the trailing axis
    for i in 0..ndim {
        let a_dim = if i < a.len() { a[a.len() - 1 - i] } else { 1 };
        let b_dim = if i < b.len() { b[b.len() - 1 - i] } else { 1 };

        if a_dim == b_dim || b_dim == 1 {
            result.push(a_dim);
        } else if a_dim == 1 {
            result.push(b_dim);
        } else {
            return None;
        }
    }

    result.reverse();
    Some(result)
}

/// Holds the broadcast batch and calls the user supplied term generators on it.
pub(crate) struct Terms<'g, T, A, B> {
    a: &'g A,
    b: &'g B,
    x: ArrayD<T>,
    args: Vec<ArrayD<T>>,
    shape: Vec<usize>,
    a_calls: usize,
    b_calls: usize,
}

impl<'g, T: Element, A: TermGenerator<T>, B: TermGenerator<T>> Terms<'g, T, A, B> {
    /// Broadcast `x` and `args` to their common shape
    pub fn new(a: &'g A, b: &'g B, x: &ArrayD<T>, args: &[ArrayD<T>]) -> Result<Self, ContinuedFractionError> {
        let incompatible = || ContinuedFractionError::IncompatibleArguments {
            shapes: core::iter::once(x).chain(args).map(|v| v.shape().to_vec()).collect(),
        };

        let mut shape = x.shape().to_vec();
        for arg in args {
            shape = broadcast_shape(&shape, arg.shape()).ok_or_else(incompatible)?;
        }

        let expand = |v: &ArrayD<T>| -> Result<ArrayD<T>, ContinuedFractionError> {
            v.broadcast(IxDyn(&shape)).map(|view| view.to_owned()).ok_or_else(incompatible)
        };
        let x = expand(x)?;
        let args = args.iter().map(expand).collect::<Result<Vec<_>, _>>()?;

        Ok(Terms { a, b, x, args, shape, a_calls: 0, b_calls: 0 })
    }

    #[inline]
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Elements whose inputs are all finite
    pub fn finite_mask(&self) -> ArrayD<bool> {
        let mut mask = self.x.mapv(T::is_finite);
        for arg in &self.args {
            Zip::from(&mut mask).and(arg).for_each(|m, &v| *m = *m && v.is_finite());
        }
        mask
    }

    /// Number of evaluations of the generators, which is the same for `a` and `b`
    #[inline]
    pub fn nfev(&self) -> usize {
        debug_assert_eq!(self.a_calls, self.b_calls);
        self.b_calls
    }

    pub fn eval_a(&mut self, n: usize) -> Result<ArrayD<T>, ContinuedFractionError> {
        self.a_calls += 1;
        let out = self.a.term(n, &self.x, &self.args);
        self.coerce('a', n, out)
    }

    pub fn eval_b(&mut self, n: usize) -> Result<ArrayD<T>, ContinuedFractionError> {
        self.b_calls += 1;
        let out = self.b.term(n, &self.x, &self.args);
        self.coerce('b', n, out)
    }

    /// Bring a generated term array to the batch shape
    fn coerce(&self, term: char, n: usize, out: ArrayD<T>) -> Result<ArrayD<T>, ContinuedFractionError> {
        if out.shape() == self.shape.as_slice() {
            return Ok(out);
        }
        match out.broadcast(IxDyn(&self.shape)) {
            Some(view) => Ok(view.to_owned()),
            None => Err(ContinuedFractionError::TermShape {
                term,
                n,
                expected: self.shape.clone(),
                found: out.shape().to_vec(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{arr0, arr1, arr2, Array};

    fn scaled(n: usize, x: &ArrayD<f64>, _: &[ArrayD<f64>]) -> ArrayD<f64> {
        x.mapv(|v| v * n as f64)
    }

    fn constant(_: usize, _: &ArrayD<f64>, _: &[ArrayD<f64>]) -> ArrayD<f64> {
        arr0(2.).into_dyn()
    }

    #[test]
    fn broadcast_shape_test() {
        assert_eq!(broadcast_shape(&[], &[]), Some(vec![]));
        assert_eq!(broadcast_shape(&[3], &[]), Some(vec![3]));
        assert_eq!(broadcast_shape(&[3, 1], &[2]), Some(vec![3, 2]));
        assert_eq!(broadcast_shape(&[1], &[4, 5]), Some(vec![4, 5]));
        assert_eq!(broadcast_shape(&[3], &[2]), None);
    }

    #[test]
    fn batch_test() {
        let x = arr1(&[1f64, 2., 3.]).into_dyn();
        let y = arr2(&[[1f64], [f64::NAN]]).into_dyn();
        let terms = Terms::new(&scaled, &scaled, &x, &[y]).unwrap();
        assert_eq!(terms.shape(), &[2, 3]);
        assert_eq!(
            terms.finite_mask(),
            arr2(&[[true, true, true], [false, false, false]]).into_dyn()
        );

        let x = arr1(&[1f64, f64::INFINITY]).into_dyn();
        let terms = Terms::new(&scaled, &scaled, &x, &[]).unwrap();
        assert_eq!(terms.finite_mask(), arr1(&[true, false]).into_dyn());

        let z = Array::<f64, _>::zeros(2).into_dyn();
        let err = Terms::new(&scaled, &scaled, &arr1(&[1f64, 2., 3.]).into_dyn(), &[z]).err().unwrap();
        assert_eq!(
            err,
            ContinuedFractionError::IncompatibleArguments { shapes: vec![vec![3], vec![2]] }
        );
    }

    #[test]
    fn eval_test() {
        let x = arr1(&[1f64, 2.]).into_dyn();
        let mut terms = Terms::new(&scaled, &constant, &x, &[]).unwrap();
        assert_eq!(terms.eval_a(3).unwrap(), arr1(&[3., 6.]).into_dyn());
        // scalar results are broadcast up to the batch
        assert_eq!(terms.eval_b(3).unwrap(), arr1(&[2., 2.]).into_dyn());
        assert_eq!(terms.nfev(), 1);

        let wrong = |_: usize, _: &ArrayD<f64>, _: &[ArrayD<f64>]| arr1(&[1f64, 2., 3.]).into_dyn();
        let mut terms = Terms::new(&wrong, &constant, &x, &[]).unwrap();
        let err = terms.eval_a(0).unwrap_err();
        assert_eq!(
            err,
            ContinuedFractionError::TermShape { term: 'a', n: 0, expected: vec![2], found: vec![3] }
        );
    }
}
