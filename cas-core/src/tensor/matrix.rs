//! Square matrices: determinants, cofactors, adjugates, inverses and integer powers.

use crate::{
    error::{kind, Error, Result},
    interp::Interpreter,
    keyword::Keyword,
    node::NodeRef,
};

/// Above this size the determinant skips the cofactors of zero entries.
const CLOSED_FORM_SIZE: usize = 3;

/// Returns the elements of the `n` by `n` matrix `elems` without row `row` and column `col`.
fn minor_elems(n: usize, elems: &[NodeRef], row: usize, col: usize) -> Vec<NodeRef> {
    let mut minor = Vec::with_capacity((n - 1) * (n - 1));
    for i in (0..n).filter(|&i| i != row) {
        for j in (0..n).filter(|&j| j != col) {
            minor.push(elems[i * n + j]);
        }
    }
    minor
}

impl Interpreter {
    /// Returns the size and elements of a square matrix, or an error naming `function` if `p` is
    /// a tensor of another shape. Returns `None` for anything that is not a tensor.
    fn square_matrix(&self, p: NodeRef, function: &'static str) -> Result<Option<(usize, Vec<NodeRef>)>> {
        match self.tensor(p) {
            Some(t) if t.is_square() => Ok(Some((t.dims[0], t.elems.clone()))),
            Some(_) => Err(Error::new(kind::NotSquareMatrix { function })),
            None => Ok(None),
        }
    }

    /// Evaluates a one-based row or column argument.
    fn matrix_index(&mut self, p1: NodeRef, n: usize, size: usize) -> Result<usize> {
        let p = self.eval_arg(p1, n)?;
        match self.small_integer(p) {
            Some(k) if k >= 1 && k as usize <= size => Ok(k as usize - 1),
            Some(k) => Err(Error::new(kind::IndexOutOfRange { index: k, size })),
            None => Err(Error::new(kind::InvalidArgument { function: "minor", expected: "integer indices" })),
        }
    }

    /// Returns the determinant of the `n` by `n` matrix `elems`.
    pub(crate) fn determinant(&mut self, n: usize, elems: &[NodeRef]) -> Result<NodeRef> {
        match n {
            0 => Ok(self.consts.one),
            1 => Ok(elems[0]),
            2 => {
                let ad = self.mul_nodes(elems[0], elems[3])?;
                let bc = self.mul_nodes(elems[1], elems[2])?;
                self.sub_nodes(ad, bc)
            },
            _ => {
                let mut terms = 0;
                for j in 0..n {
                    let a = elems[j];
                    if n > CLOSED_FORM_SIZE && self.is_zero(a) {
                        continue;
                    }
                    let minor = minor_elems(n, elems, 0, j);
                    let det = self.determinant(n - 1, &minor)?;
                    let mut term = self.mul_nodes(a, det)?;
                    if j % 2 == 1 {
                        term = self.neg_node(term)?;
                    }
                    self.push(term)?;
                    terms += 1;
                }
                self.add_terms(terms)?;
                self.pop()
            },
        }
    }

    /// Returns the cofactor of entry (`row`, `col`): the signed determinant of its minor.
    fn cofactor_of(&mut self, n: usize, elems: &[NodeRef], row: usize, col: usize) -> Result<NodeRef> {
        let minor = minor_elems(n, elems, row, col);
        let det = self.determinant(n - 1, &minor)?;
        if (row + col) % 2 == 1 {
            self.neg_node(det)
        } else {
            Ok(det)
        }
    }

    /// Pops a square matrix and pushes its determinant.
    pub(crate) fn det(&mut self) -> Result<()> {
        let p = self.pop()?;
        let q = match self.square_matrix(p, "det")? {
            Some((n, elems)) => self.determinant(n, &elems)?,
            None => self.apply(Keyword::Det, &[p])?,
        };
        self.push(q)
    }

    fn adjugate(&mut self, n: usize, elems: &[NodeRef]) -> Result<NodeRef> {
        if n == 1 {
            let one = self.consts.one;
            return self.tensor_node(vec![1, 1], vec![one]);
        }
        let mut adj = Vec::with_capacity(n * n);
        for i in 0..n {
            for j in 0..n {
                adj.push(self.cofactor_of(n, elems, j, i)?);
            }
        }
        self.tensor_node(vec![n, n], adj)
    }

    /// Pops a square matrix and pushes its adjugate, the transpose of its cofactor matrix.
    pub(crate) fn adj(&mut self) -> Result<()> {
        let p = self.pop()?;
        let q = match self.square_matrix(p, "adj")? {
            Some((n, elems)) => self.adjugate(n, &elems)?,
            None => self.apply(Keyword::Adj, &[p])?,
        };
        self.push(q)
    }

    fn inverse(&mut self, n: usize, elems: &[NodeRef]) -> Result<NodeRef> {
        let det = self.determinant(n, elems)?;
        if self.is_zero(det) {
            return Err(Error::new(kind::SingularMatrix));
        }
        let adj = self.adjugate(n, elems)?;
        let inv = self.call1(Self::reciprocate, det)?;
        self.scale_tensor(adj, inv)
    }

    /// Pops a square matrix and pushes its inverse. The inverse of a scalar is its reciprocal.
    pub(crate) fn inv(&mut self) -> Result<()> {
        let p = self.pop()?;
        let q = match self.square_matrix(p, "inv")? {
            Some((n, elems)) => self.inverse(n, &elems)?,
            None => self.call1(Self::reciprocate, p)?,
        };
        self.push(q)
    }

    /// Evaluates `(function a i j)` to a square matrix and two zero-based indices.
    fn matrix_and_entry(&mut self, p1: NodeRef, function: &'static str) -> Result<Option<(usize, Vec<NodeRef>, usize, usize)>> {
        let a = self.eval_arg(p1, 1)?;
        let Some((n, elems)) = self.square_matrix(a, function)? else {
            return Ok(None);
        };
        let i = self.matrix_index(p1, 2, n)?;
        let j = self.matrix_index(p1, 3, n)?;
        Ok(Some((n, elems, i, j)))
    }

    /// Pushes an unevaluated `(function a i j)` with evaluated arguments.
    fn push_unevaluated(&mut self, keyword: Keyword, p1: NodeRef) -> Result<()> {
        let mut args = Vec::new();
        for arg in self.args(p1) {
            args.push(self.eval_value(arg)?);
        }
        let p = self.apply(keyword, &args)?;
        self.push(p)
    }

    /// `cofactor(a, i, j)`
    pub(crate) fn eval_cofactor(&mut self, p1: NodeRef) -> Result<()> {
        match self.matrix_and_entry(p1, "cofactor")? {
            Some((n, elems, i, j)) => {
                let q = self.cofactor_of(n, &elems, i, j)?;
                self.push(q)
            },
            None => self.push_unevaluated(Keyword::Cofactor, p1),
        }
    }

    /// `minor(a, i, j)`, the determinant of `a` without row `i` and column `j`.
    pub(crate) fn eval_minor(&mut self, p1: NodeRef) -> Result<()> {
        match self.matrix_and_entry(p1, "minor")? {
            Some((n, elems, i, j)) => {
                let minor = minor_elems(n, &elems, i, j);
                let q = self.determinant(n - 1, &minor)?;
                self.push(q)
            },
            None => self.push_unevaluated(Keyword::Minor, p1),
        }
    }

    /// `minormatrix(a, i, j)`, the matrix `a` without row `i` and column `j`.
    pub(crate) fn eval_minormatrix(&mut self, p1: NodeRef) -> Result<()> {
        match self.matrix_and_entry(p1, "minormatrix")? {
            Some((1, _, _, _)) => Err(Error::new(kind::InvalidArgument {
                function: "minormatrix",
                expected: "a matrix larger than 1 by 1",
            })),
            Some((n, elems, i, j)) => {
                let minor = minor_elems(n, &elems, i, j);
                let q = self.tensor_node(vec![n - 1, n - 1], minor)?;
                self.push(q)
            },
            None => self.push_unevaluated(Keyword::Minormatrix, p1),
        }
    }

    /// Raises a tensor to a power. Square matrices take integer powers by repeated squaring,
    /// negative powers through the inverse.
    pub(crate) fn power_tensor(&mut self, base: NodeRef, expo: NodeRef) -> Result<NodeRef> {
        if self.is_one(expo) && self.is_rational(expo) {
            return Ok(base);
        }
        let Some(n) = self.small_integer(expo) else {
            return self.apply(Keyword::Power, &[base, expo]);
        };
        let Some((size, elems)) = self.square_matrix(base, "power")? else {
            return self.apply(Keyword::Power, &[base, expo]);
        };

        let mut square = if n < 0 {
            self.inverse(size, &elems)?
        } else {
            base
        };
        let mut result = self.identity(size)?;
        let mut k = n.unsigned_abs();
        while k > 0 {
            self.check_interrupt()?;
            if k & 1 == 1 {
                result = self.inner_pair(result, square)?;
            }
            k >>= 1;
            if k > 0 {
                square = self.inner_pair(square, square)?;
            }
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use crate::{error::kind, Interpreter};

    fn eval(source: &str) -> String {
        Interpreter::new().eval_str(source).unwrap()
    }

    #[test]
    fn determinants() {
        assert_eq!(eval("det(((a, b), (c, d)))"), "a*d - b*c");
        assert_eq!(eval("det(((1, 2, 3), (4, 5, 6), (7, 8, 10)))"), "-3");
        assert_eq!(eval("det(unit(5))"), "1");
        assert_eq!(eval("det(A)"), "det(A)");
    }

    #[test]
    fn non_square() {
        let err = Interpreter::new().eval_str("det(((1, 2, 3), (4, 5, 6)))").unwrap_err();
        assert!(err.is::<kind::NotSquareMatrix>());
    }

    #[test]
    fn adjugate_and_inverse() {
        assert_eq!(eval("adj(((1, 2), (3, 4)))"), "((4,-2),(-3,1))");
        assert_eq!(eval("inv(((1, 2), (3, 4)))"), "((-2,1),(3/2,-1/2))");
        assert_eq!(eval("A = ((2, 1), (1, 1))\ndot(A, inv(A))"), "((1,0),(0,1))");
        let err = Interpreter::new().eval_str("inv(((1, 2), (2, 4)))").unwrap_err();
        assert!(err.is::<kind::SingularMatrix>());
    }

    #[test]
    fn cofactors_and_minors() {
        let a = "A = ((1, 2, 3), (4, 5, 6), (7, 8, 10))\n";
        assert_eq!(eval(&format!("{a}minor(A, 1, 1)")), "2");
        assert_eq!(eval(&format!("{a}cofactor(A, 1, 2)")), "2");
        assert_eq!(eval(&format!("{a}minormatrix(A, 2, 2)")), "((1,3),(7,10))");
    }

    #[test]
    fn matrix_powers() {
        assert_eq!(eval("((1, 1), (0, 1))^3"), "((1,3),(0,1))");
        assert_eq!(eval("((1, 1), (0, 1))^0"), "((1,0),(0,1))");
        assert_eq!(eval("((1, 1), (0, 1))^(-2)"), "((1,-2),(0,1))");
    }
}
