//! Tensors: evaluation, elementwise arithmetic, products, shapes and indexing.
//!
//! A tensor is stored as a row-major buffer of elements with one dimension per axis. Axes are
//! numbered from one in every user-facing function.

mod matrix;

use crate::{
    error::{kind, Error, Result},
    interp::Interpreter,
    keyword::Keyword,
    node::{NodeRef, Tensor},
};

/// Returns the row-major strides of a tensor with the given dimensions.
fn strides(dims: &[usize]) -> Vec<usize> {
    let mut strides = vec![1; dims.len()];
    for axis in (0..dims.len().saturating_sub(1)).rev() {
        strides[axis] = strides[axis + 1] * dims[axis + 1];
    }
    strides
}

/// Returns the multi-index of the `flat`th element of a tensor with the given dimensions.
fn unflatten(mut flat: usize, dims: &[usize]) -> Vec<usize> {
    let mut index = vec![0; dims.len()];
    for axis in (0..dims.len()).rev() {
        index[axis] = flat % dims[axis];
        flat /= dims[axis];
    }
    index
}

fn mismatch(expected: &[usize], found: &[usize]) -> Error {
    Error::new(kind::TensorDimensionMismatch {
        expected: expected.to_vec(),
        found: found.to_vec(),
    })
}

impl Interpreter {
    /// Returns a copy of the dimensions and elements of a tensor node.
    pub(crate) fn tensor_parts(&self, p: NodeRef) -> Option<(Vec<usize>, Vec<NodeRef>)> {
        self.tensor(p).map(|t| (t.dims.clone(), t.elems.clone()))
    }

    /// Evaluates every element of a tensor. If the elements are themselves tensors of one shape,
    /// they are merged into a single tensor of higher rank.
    pub(crate) fn eval_tensor(&mut self, p1: NodeRef) -> Result<()> {
        let Some((dims, elems)) = self.tensor_parts(p1) else {
            return self.push(p1);
        };
        let mut values = Vec::with_capacity(elems.len());
        for e in elems {
            values.push(self.eval_value(e)?);
        }
        let p = self.promote_tensor(dims, values)?;
        self.push(p)
    }

    fn promote_tensor(&mut self, mut dims: Vec<usize>, elems: Vec<NodeRef>) -> Result<NodeRef> {
        let inner = elems.first().and_then(|&e| self.tensor(e)).map(|t| t.dims.clone());
        let Some(inner) = inner else {
            if let Some(t) = elems.iter().find_map(|&e| self.tensor(e)) {
                return Err(mismatch(&[], &t.dims));
            }
            return self.tensor_node(dims, elems);
        };

        let mut merged = Vec::with_capacity(elems.len() * Tensor::size_of(&inner));
        for &e in &elems {
            match self.tensor(e) {
                Some(t) if t.dims == inner => merged.extend_from_slice(&t.elems),
                Some(t) => return Err(mismatch(&inner, &t.dims)),
                None => return Err(mismatch(&inner, &[])),
            }
        }
        dims.extend(inner);
        self.tensor_node(dims, merged)
    }

    /// Applies `f` to corresponding elements of two tensors of the same shape.
    fn zip_tensors(
        &mut self,
        a: NodeRef,
        b: NodeRef,
        f: fn(&mut Self, NodeRef, NodeRef) -> Result<NodeRef>,
    ) -> Result<NodeRef> {
        let (Some((dims, xs)), Some((dims_b, ys))) = (self.tensor_parts(a), self.tensor_parts(b)) else {
            return Err(Error::new(kind::InternalError { message: "zip of non-tensors" }));
        };
        if dims != dims_b {
            return Err(mismatch(&dims, &dims_b));
        }
        let mut elems = Vec::with_capacity(xs.len());
        for (x, y) in xs.into_iter().zip(ys) {
            elems.push(f(self, x, y)?);
        }
        self.tensor_node(dims, elems)
    }

    /// Returns the elementwise sum of two tensors.
    pub(crate) fn add_tensors(&mut self, a: NodeRef, b: NodeRef) -> Result<NodeRef> {
        self.zip_tensors(a, b, Self::add_nodes)
    }

    /// Returns the elementwise product of two tensors.
    pub(crate) fn hadamard_tensors(&mut self, a: NodeRef, b: NodeRef) -> Result<NodeRef> {
        self.zip_tensors(a, b, Self::mul_nodes)
    }

    /// Multiplies every element of a tensor by a scalar.
    pub(crate) fn scale_tensor(&mut self, t: NodeRef, scalar: NodeRef) -> Result<NodeRef> {
        if self.is_one(scalar) && self.is_rational(scalar) {
            return Ok(t);
        }
        let Some((dims, elems)) = self.tensor_parts(t) else {
            return self.mul_nodes(scalar, t);
        };
        let mut scaled = Vec::with_capacity(elems.len());
        for e in elems {
            scaled.push(self.mul_nodes(scalar, e)?);
        }
        self.tensor_node(dims, scaled)
    }

    /// Evaluates the arguments of `p1` and folds them from the left with `f`.
    fn fold_args(&mut self, p1: NodeRef, f: fn(&mut Self, NodeRef, NodeRef) -> Result<NodeRef>) -> Result<()> {
        let args = self.args(p1);
        let mut acc = None;
        for arg in args {
            let value = self.eval_value(arg)?;
            acc = Some(match acc {
                Some(acc) => f(self, acc, value)?,
                None => value,
            });
        }
        let result = acc.unwrap_or(self.consts.nil);
        self.push(result)
    }

    /// `hadamard(a, b, ...)`, the elementwise product.
    pub(crate) fn eval_hadamard(&mut self, p1: NodeRef) -> Result<()> {
        self.fold_args(p1, |interp, a, b| {
            if interp.is_tensor(a) && interp.is_tensor(b) {
                interp.hadamard_tensors(a, b)
            } else {
                interp.mul_nodes(a, b)
            }
        })
    }

    /// `inner(a, b, ...)` or `dot(a, b, ...)`.
    pub(crate) fn eval_inner(&mut self, p1: NodeRef) -> Result<()> {
        self.fold_args(p1, Self::inner_pair)
    }

    /// Contracts the last axis of `a` with the first axis of `b`. Scalars multiply.
    pub(crate) fn inner_pair(&mut self, a: NodeRef, b: NodeRef) -> Result<NodeRef> {
        let (Some((dims_a, xs)), Some((dims_b, ys))) = (self.tensor_parts(a), self.tensor_parts(b)) else {
            return self.mul_nodes(a, b);
        };
        let n = dims_a[dims_a.len() - 1];
        if n != dims_b[0] {
            return Err(mismatch(&dims_a, &dims_b));
        }

        let rows = xs.len() / n;
        let cols = ys.len() / n;
        let mut elems = Vec::with_capacity(rows * cols);
        for i in 0..rows {
            for j in 0..cols {
                for k in 0..n {
                    let product = self.mul_nodes(xs[i * n + k], ys[k * cols + j])?;
                    self.push(product)?;
                }
                self.add_terms(n)?;
                elems.push(self.pop()?);
            }
        }

        let mut dims = dims_a[..dims_a.len() - 1].to_vec();
        dims.extend_from_slice(&dims_b[1..]);
        self.tensor_node(dims, elems)
    }

    /// `outer(a, b, ...)`, the tensor product without contraction.
    pub(crate) fn eval_outer(&mut self, p1: NodeRef) -> Result<()> {
        self.fold_args(p1, Self::outer_pair)
    }

    fn outer_pair(&mut self, a: NodeRef, b: NodeRef) -> Result<NodeRef> {
        let (Some((dims_a, xs)), Some((dims_b, ys))) = (self.tensor_parts(a), self.tensor_parts(b)) else {
            return self.mul_nodes(a, b);
        };
        let mut elems = Vec::with_capacity(xs.len() * ys.len());
        for &x in &xs {
            for &y in &ys {
                elems.push(self.mul_nodes(x, y)?);
            }
        }
        let mut dims = dims_a;
        dims.extend(dims_b);
        self.tensor_node(dims, elems)
    }

    /// `kronecker(a, b, ...)`, the Kronecker product of vectors or matrices.
    pub(crate) fn eval_kronecker(&mut self, p1: NodeRef) -> Result<()> {
        self.fold_args(p1, Self::kronecker_pair)
    }

    fn kronecker_pair(&mut self, a: NodeRef, b: NodeRef) -> Result<NodeRef> {
        let (Some((dims_a, xs)), Some((dims_b, ys))) = (self.tensor_parts(a), self.tensor_parts(b)) else {
            return self.mul_nodes(a, b);
        };
        if dims_a.len() != dims_b.len() || dims_a.len() > 2 {
            return Err(Error::new(kind::InvalidArgument {
                function: "kronecker",
                expected: "two vectors or two matrices",
            }));
        }
        if dims_a.len() == 1 {
            return self.outer_pair(a, b).and_then(|t| self.flatten_tensor(t));
        }

        let (m, n, p, q) = (dims_a[0], dims_a[1], dims_b[0], dims_b[1]);
        let mut elems = Vec::with_capacity(m * n * p * q);
        for i in 0..m {
            for k in 0..p {
                for j in 0..n {
                    for l in 0..q {
                        elems.push(self.mul_nodes(xs[i * n + j], ys[k * q + l])?);
                    }
                }
            }
        }
        self.tensor_node(vec![m * p, n * q], elems)
    }

    fn flatten_tensor(&mut self, t: NodeRef) -> Result<NodeRef> {
        match self.tensor_parts(t) {
            Some((_, elems)) => self.tensor_node(vec![elems.len()], elems),
            None => Ok(t),
        }
    }

    /// Evaluates an optional axis argument, counting from one.
    fn axis_arg(&mut self, p1: NodeRef, n: usize, default: usize, rank: usize) -> Result<usize> {
        if self.length(p1) <= n {
            return Ok(default);
        }
        let p = self.eval_arg(p1, n)?;
        match self.small_integer(p) {
            Some(axis) if axis >= 1 && axis as usize <= rank => Ok(axis as usize - 1),
            Some(axis) => Err(Error::new(kind::IndexOutOfRange { index: axis, size: rank })),
            None => Err(Error::new(kind::InvalidArgument { function: "axis", expected: "an integer" })),
        }
    }

    /// `contract(a, i, j)` sums over the diagonal of axes `i` and `j`, by default the first two.
    pub(crate) fn eval_contract(&mut self, p1: NodeRef) -> Result<()> {
        let a = self.eval_arg(p1, 1)?;
        let Some((dims, elems)) = self.tensor_parts(a) else {
            return self.push(a);
        };
        if dims.len() < 2 {
            return Err(Error::new(kind::InvalidArgument {
                function: "contract",
                expected: "a tensor of rank two or more",
            }));
        }
        let i = self.axis_arg(p1, 2, 0, dims.len())?;
        let j = self.axis_arg(p1, 3, 1, dims.len())?;
        if i == j || dims[i] != dims[j] {
            return Err(mismatch(&[dims[i]], &[dims[j]]));
        }

        let kept = (0..dims.len()).filter(|&axis| axis != i && axis != j).collect::<Vec<_>>();
        let result_dims = kept.iter().map(|&axis| dims[axis]).collect::<Vec<_>>();
        let stride = strides(&dims);
        let mut result = Vec::with_capacity(Tensor::size_of(&result_dims));
        for flat in 0..Tensor::size_of(&result_dims) {
            let index = unflatten(flat, &result_dims);
            let base = kept.iter().zip(&index).map(|(&axis, &k)| k * stride[axis]).sum::<usize>();
            for k in 0..dims[i] {
                self.push(elems[base + k * (stride[i] + stride[j])])?;
            }
            self.add_terms(dims[i])?;
            result.push(self.pop()?);
        }
        let p = self.tensor_node(result_dims, result)?;
        self.push(p)
    }

    /// `transpose(a, i, j)` exchanges axes `i` and `j`, by default the first two.
    pub(crate) fn eval_transpose(&mut self, p1: NodeRef) -> Result<()> {
        let a = self.eval_arg(p1, 1)?;
        let Some((dims, elems)) = self.tensor_parts(a) else {
            return self.push(a);
        };
        if dims.len() < 2 {
            return self.push(a);
        }
        let i = self.axis_arg(p1, 2, 0, dims.len())?;
        let j = self.axis_arg(p1, 3, 1, dims.len())?;
        let p = self.transpose_axes(&dims, &elems, i, j)?;
        self.push(p)
    }

    pub(crate) fn transpose_axes(&mut self, dims: &[usize], elems: &[NodeRef], i: usize, j: usize) -> Result<NodeRef> {
        let mut result_dims = dims.to_vec();
        result_dims.swap(i, j);
        let stride = strides(dims);
        let mut result = Vec::with_capacity(elems.len());
        for flat in 0..elems.len() {
            let mut index = unflatten(flat, &result_dims);
            index.swap(i, j);
            let source = index.iter().zip(&stride).map(|(k, s)| k * s).sum::<usize>();
            result.push(elems[source]);
        }
        self.tensor_node(result_dims, result)
    }

    /// `dim(a, n)` is the size of axis `n` of `a`, by default the first.
    pub(crate) fn eval_dim(&mut self, p1: NodeRef) -> Result<()> {
        let a = self.eval_arg(p1, 1)?;
        let Some((dims, _)) = self.tensor_parts(a) else {
            return self.push(self.consts.one);
        };
        let axis = self.axis_arg(p1, 2, 0, dims.len())?;
        self.push_integer(dims[axis] as i64)
    }

    /// Pops `a` and pushes its rank, zero for a scalar.
    pub(crate) fn rank(&mut self) -> Result<()> {
        let p = self.pop()?;
        let rank = self.tensor(p).map_or(0, Tensor::rank);
        self.push_integer(rank as i64)
    }

    /// Evaluates the arguments of `p1` as a list of positive dimensions.
    fn dims_args(&mut self, p1: NodeRef, function: &'static str) -> Result<Vec<usize>> {
        let args = self.args(p1);
        let mut dims = Vec::with_capacity(args.len());
        for arg in args {
            let p = self.eval_value(arg)?;
            match self.small_integer(p) {
                Some(n) if n >= 1 => dims.push(n as usize),
                _ => return Err(Error::new(kind::InvalidArgument { function, expected: "positive integer dimensions" })),
            }
        }
        Ok(dims)
    }

    /// `unit(n)` is the `n` by `n` identity matrix.
    pub(crate) fn eval_unit(&mut self, p1: NodeRef) -> Result<()> {
        let dims = self.dims_args(p1, "unit")?;
        let [n] = dims[..] else {
            return Err(Error::new(kind::InvalidArgument { function: "unit", expected: "one dimension" }));
        };
        let p = self.identity(n)?;
        self.push(p)
    }

    pub(crate) fn identity(&mut self, n: usize) -> Result<NodeRef> {
        let (zero, one) = (self.consts.zero, self.consts.one);
        let elems = (0..n * n).map(|k| if k / n == k % n { one } else { zero }).collect();
        self.tensor_node(vec![n, n], elems)
    }

    /// `zero(i, j, ...)` is a tensor of zeros with the given dimensions.
    pub(crate) fn eval_zero(&mut self, p1: NodeRef) -> Result<()> {
        let dims = self.dims_args(p1, "zero")?;
        if dims.is_empty() {
            return self.push(self.consts.zero);
        }
        let elems = vec![self.consts.zero; Tensor::size_of(&dims)];
        let p = self.tensor_node(dims, elems)?;
        self.push(p)
    }

    /// Evaluates index arguments, checking them against the dimensions of the tensor. Returns
    /// the offset of the first selected element and the dimensions of the selection.
    fn select(&mut self, indices: &[NodeRef], dims: &[usize]) -> Result<Option<(usize, Vec<usize>)>> {
        if indices.len() > dims.len() {
            return Err(Error::new(kind::InvalidArgument {
                function: "index",
                expected: "no more indices than the rank",
            }));
        }
        let stride = strides(dims);
        let mut offset = 0;
        for (axis, &index) in indices.iter().enumerate() {
            let p = self.eval_value(index)?;
            let Some(k) = self.small_integer(p) else {
                return Ok(None);
            };
            if k < 1 || k as usize > dims[axis] {
                return Err(Error::new(kind::IndexOutOfRange { index: k, size: dims[axis] }));
            }
            offset += (k as usize - 1) * stride[axis];
        }
        Ok(Some((offset, dims[indices.len()..].to_vec())))
    }

    /// `a[i, j, ...]`. Fewer indices than the rank select a sub-tensor. A symbolic target or
    /// index leaves the expression unevaluated.
    pub(crate) fn eval_index(&mut self, p1: NodeRef) -> Result<()> {
        let target = self.eval_arg(p1, 1)?;
        let indices = self.args(p1)[1..].to_vec();
        let Some((dims, elems)) = self.tensor_parts(target) else {
            return self.index_unevaluated(target, &indices);
        };
        let Some((offset, sub_dims)) = self.select(&indices, &dims)? else {
            return self.index_unevaluated(target, &indices);
        };
        let size = Tensor::size_of(&sub_dims);
        let p = self.tensor_node(sub_dims, elems[offset..offset + size].to_vec())?;
        self.push(p)
    }

    fn index_unevaluated(&mut self, target: NodeRef, indices: &[NodeRef]) -> Result<()> {
        let mut items = vec![self.keyword(Keyword::Index), target];
        for &index in indices {
            items.push(self.eval_value(index)?);
        }
        let p = self.list(&items)?;
        self.push(p)
    }

    /// `a[i, j, ...] = x` replaces a component, or a sub-tensor of the same shape as `x`, of the
    /// tensor bound to `a`. Pushes `nil`.
    pub(crate) fn set_component(&mut self, p1: NodeRef) -> Result<()> {
        let lhs = self.cadr(p1);
        let rhs = self.caddr(p1);
        let symbol = self.cadr(lhs);
        self.expect_symbol(symbol, "component assignment")?;

        let target = self.eval_value(symbol)?;
        let Some((dims, mut elems)) = self.tensor_parts(target) else {
            return Err(Error::new(kind::InvalidArgument {
                function: "component assignment",
                expected: "a symbol bound to a tensor",
            }));
        };
        let indices = self.cddr(lhs);
        let indices = self.items(indices);
        let Some((offset, sub_dims)) = self.select(&indices, &dims)? else {
            return Err(Error::new(kind::InvalidArgument {
                function: "component assignment",
                expected: "integer indices",
            }));
        };

        let value = self.eval_value(rhs)?;
        match self.tensor_parts(value) {
            Some((value_dims, value_elems)) => {
                if value_dims != sub_dims {
                    return Err(mismatch(&sub_dims, &value_dims));
                }
                elems[offset..offset + value_elems.len()].copy_from_slice(&value_elems);
            },
            None if sub_dims.is_empty() => elems[offset] = value,
            None => return Err(mismatch(&sub_dims, &[])),
        }

        let p = self.tensor_node(dims, elems)?;
        self.set_binding(symbol, p)?;
        self.push(self.consts.nil)
    }
}

#[cfg(test)]
mod tests {
    use crate::{error::kind, Interpreter};

    fn eval(source: &str) -> String {
        Interpreter::new().eval_str(source).unwrap()
    }

    #[test]
    fn literals_promote_rank() {
        assert_eq!(eval("((1, 2), (3, 4))"), "((1,2),(3,4))");
        assert_eq!(eval("rank(((1, 2), (3, 4)))"), "2");
        assert_eq!(eval("dim(((1, 2, 3), (4, 5, 6)), 2)"), "3");
    }

    #[test]
    fn ragged_literals_fail() {
        let err = Interpreter::new().eval_str("((1, 2), (3, 4, 5))").unwrap_err();
        assert!(err.is::<kind::TensorDimensionMismatch>());
        let err = Interpreter::new().eval_str("((1, 2), 3)").unwrap_err();
        assert!(err.is::<kind::TensorDimensionMismatch>());
    }

    #[test]
    fn elementwise_arithmetic() {
        assert_eq!(eval("(1, 2) + (3, 4)"), "(4,6)");
        assert_eq!(eval("2*(x, y)"), "(2*x,2*y)");
        assert_eq!(eval("hadamard((1, 2), (3, 4))"), "(3,8)");
        let err = Interpreter::new().eval_str("(1, 2) + (1, 2, 3)").unwrap_err();
        assert!(err.is::<kind::TensorDimensionMismatch>());
    }

    #[test]
    fn products() {
        assert_eq!(eval("dot((1, 2), (3, 4))"), "11");
        assert_eq!(eval("dot(((1, 2), (3, 4)), (5, 6))"), "(17,39)");
        assert_eq!(eval("outer((1, 2), (3, 4))"), "((3,4),(6,8))");
        assert_eq!(eval("kronecker(((1, 0), (0, 1)), ((1, 2), (3, 4)))"),
            "((1,2,0,0),(3,4,0,0),(0,0,1,2),(0,0,3,4))");
    }

    #[test]
    fn contraction_and_transpose() {
        assert_eq!(eval("contract(((1, 2), (3, 4)))"), "5");
        assert_eq!(eval("transpose(((1, 2), (3, 4)))"), "((1,3),(2,4))");
        assert_eq!(eval("transpose(((1, 2, 3), (4, 5, 6)))"), "((1,4),(2,5),(3,6))");
    }

    #[test]
    fn constructors() {
        assert_eq!(eval("unit(2)"), "((1,0),(0,1))");
        assert_eq!(eval("zero(2, 3)"), "((0,0,0),(0,0,0))");
    }

    #[test]
    fn indexing() {
        assert_eq!(eval("A = ((1, 2), (3, 4))\nA[2, 1]"), "3");
        assert_eq!(eval("A = ((1, 2), (3, 4))\nA[2]"), "(3,4)");
        assert_eq!(eval("B[1, 2]"), "B[1,2]");
        let err = Interpreter::new().eval_str("A = (1, 2)\nA[3]").unwrap_err();
        assert!(err.is::<kind::IndexOutOfRange>());
    }

    #[test]
    fn component_assignment() {
        assert_eq!(eval("A = zero(2, 2)\nA[1, 2] = x\nA"), "((0,x),(0,0))");
        assert_eq!(eval("A = zero(2, 2)\nA[2] = (5, 6)\nA"), "((0,0),(5,6))");
    }
}
