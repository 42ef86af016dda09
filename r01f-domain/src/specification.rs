//! 规约（Specification）
//!
//! 封装可复用、可组合的业务规则，校验器以规约为单位描述约束。
//!

type BoxedSpecification<T> = Box<dyn Specification<T> + Send + Sync>;

/// 规约模式的核心 trait
pub trait Specification<T> {
    /// 检查候选对象是否满足规约
    fn is_satisfied_by(&self, candidate: &T) -> bool;

    /// 与另一个规约进行 AND 组合
    fn and<S>(self, other: S) -> AndSpecification<T>
    where
        Self: Sized + Send + Sync + 'static,
        S: Specification<T> + Send + Sync + 'static,
    {
        AndSpecification::new(Box::new(self), Box::new(other))
    }

    /// 与另一个规约进行 OR 组合
    fn or<S>(self, other: S) -> OrSpecification<T>
    where
        Self: Sized + Send + Sync + 'static,
        S: Specification<T> + Send + Sync + 'static,
    {
        OrSpecification::new(Box::new(self), Box::new(other))
    }

    /// 对规约进行 NOT 操作
    fn not(self) -> NotSpecification<T>
    where
        Self: Sized + Send + Sync + 'static,
    {
        NotSpecification::new(Box::new(self))
    }
}

impl<T> Specification<T> for BoxedSpecification<T> {
    fn is_satisfied_by(&self, candidate: &T) -> bool {
        (**self).is_satisfied_by(candidate)
    }
}

/// 以闭包表达的规约
pub struct FnSpecification<F>(F);

impl<F> FnSpecification<F> {
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

impl<T, F> Specification<T> for FnSpecification<F>
where
    F: Fn(&T) -> bool,
{
    fn is_satisfied_by(&self, candidate: &T) -> bool {
        (self.0)(candidate)
    }
}

/// AND 组合规约
pub struct AndSpecification<T> {
    left: BoxedSpecification<T>,
    right: BoxedSpecification<T>,
}

impl<T> AndSpecification<T> {
    pub fn new(left: BoxedSpecification<T>, right: BoxedSpecification<T>) -> Self {
        Self { left, right }
    }
}

impl<T> Specification<T> for AndSpecification<T> {
    fn is_satisfied_by(&self, candidate: &T) -> bool {
        self.left.is_satisfied_by(candidate) && self.right.is_satisfied_by(candidate)
    }
}

/// OR 组合规约
pub struct OrSpecification<T> {
    left: BoxedSpecification<T>,
    right: BoxedSpecification<T>,
}

impl<T> OrSpecification<T> {
    pub fn new(left: BoxedSpecification<T>, right: BoxedSpecification<T>) -> Self {
        Self { left, right }
    }
}

impl<T> Specification<T> for OrSpecification<T> {
    fn is_satisfied_by(&self, candidate: &T) -> bool {
        self.left.is_satisfied_by(candidate) || self.right.is_satisfied_by(candidate)
    }
}

/// NOT 规约
pub struct NotSpecification<T> {
    inner: BoxedSpecification<T>,
}

impl<T> NotSpecification<T> {
    pub fn new(inner: BoxedSpecification<T>) -> Self {
        Self { inner }
    }
}

impl<T> Specification<T> for NotSpecification<T> {
    fn is_satisfied_by(&self, candidate: &T) -> bool {
        !self.inner.is_satisfied_by(candidate)
    }
}
