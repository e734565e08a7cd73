//! Per-shape lookup dispatch.
//!
//! [`Lookupable`] is implemented once per member shape. Scalars come back
//! unchanged, hardware goes through the value and view rebasers, module and
//! object references become new [`Instance`] handles, and containers recurse
//! element-wise with the same handle. [`Member`] dispatches dynamically to
//! the same implementations and produces a [`Resolved`].

use crate::context::{LookupCx, Rebaser};
use crate::errors::{RebaseError, RebaseResult};
use crate::hierarchy::{Instance, InstanceRoot};
use crate::module::Underlying;
use strata_common::Ident;
use strata_ir::{ConstValue, Either, InstantiableId, Member, MemoryId, ModuleId, Target, ValueId};

/// A member shape that can be read through a hierarchy handle.
pub trait Lookupable {
    /// What the member becomes once read through the handle.
    type Output;

    /// Reads `self` through the handle described by `cx`.
    fn lookup(self, rb: &mut Rebaser<'_>, cx: &mut LookupCx<'_>) -> RebaseResult<Self::Output>;
}

macro_rules! lookup_unchanged {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Lookupable for $ty {
                type Output = $ty;

                fn lookup(self, _: &mut Rebaser<'_>, _: &mut LookupCx<'_>) -> RebaseResult<$ty> {
                    Ok(self)
                }
            }
        )*
    };
}

lookup_unchanged!(ConstValue, i64, u32, u64, usize, bool, String, Ident);

impl Lookupable for ValueId {
    type Output = ValueId;

    fn lookup(self, rb: &mut Rebaser<'_>, cx: &mut LookupCx<'_>) -> RebaseResult<ValueId> {
        rb.lookup_data(cx, self)
    }
}

impl Lookupable for MemoryId {
    type Output = MemoryId;

    fn lookup(self, rb: &mut Rebaser<'_>, cx: &mut LookupCx<'_>) -> RebaseResult<MemoryId> {
        rb.lookup_memory(cx, self)
    }
}

impl Lookupable for Target {
    type Output = Target;

    fn lookup(self, rb: &mut Rebaser<'_>, cx: &mut LookupCx<'_>) -> RebaseResult<Target> {
        match self {
            Target::Sram(memory) => Ok(Target::Sram(memory.lookup(rb, cx)?)),
        }
    }
}

impl Lookupable for ModuleId {
    type Output = Instance;

    fn lookup(self, rb: &mut Rebaser<'_>, cx: &mut LookupCx<'_>) -> RebaseResult<Instance> {
        let original = if rb.tree().module(self).is_proxy() {
            Underlying::Clone(self)
        } else {
            Underlying::Proto(self)
        };
        let underlying = match cx.context {
            Some(context) => rb.rebase_module(original, context)?,
            None => original,
        };
        Ok(Instance::new(InstanceRoot::Module(underlying)))
    }
}

impl Lookupable for InstantiableId {
    type Output = Instance;

    fn lookup(self, _: &mut Rebaser<'_>, cx: &mut LookupCx<'_>) -> RebaseResult<Instance> {
        Ok(Instance::new(InstanceRoot::Instantiable {
            proto: self,
            context: Some(Box::new(cx.origin.clone())),
        }))
    }
}

impl<T: Lookupable> Lookupable for Vec<T> {
    type Output = Vec<T::Output>;

    fn lookup(self, rb: &mut Rebaser<'_>, cx: &mut LookupCx<'_>) -> RebaseResult<Self::Output> {
        self.into_iter().map(|item| item.lookup(rb, cx)).collect()
    }
}

impl<T: Lookupable> Lookupable for Option<T> {
    type Output = Option<T::Output>;

    fn lookup(self, rb: &mut Rebaser<'_>, cx: &mut LookupCx<'_>) -> RebaseResult<Self::Output> {
        self.map(|item| item.lookup(rb, cx)).transpose()
    }
}

impl<L: Lookupable, R: Lookupable> Lookupable for Either<L, R> {
    type Output = Either<L::Output, R::Output>;

    fn lookup(self, rb: &mut Rebaser<'_>, cx: &mut LookupCx<'_>) -> RebaseResult<Self::Output> {
        Ok(match self {
            Either::Left(left) => Either::Left(left.lookup(rb, cx)?),
            Either::Right(right) => Either::Right(right.lookup(rb, cx)?),
        })
    }
}

impl<X: Lookupable, Y: Lookupable> Lookupable for (X, Y) {
    type Output = (X::Output, Y::Output);

    fn lookup(self, rb: &mut Rebaser<'_>, cx: &mut LookupCx<'_>) -> RebaseResult<Self::Output> {
        let (x, y) = self;
        Ok((x.lookup(rb, cx)?, y.lookup(rb, cx)?))
    }
}

impl<T: Lookupable> Lookupable for Box<T> {
    type Output = Box<T::Output>;

    fn lookup(self, rb: &mut Rebaser<'_>, cx: &mut LookupCx<'_>) -> RebaseResult<Self::Output> {
        Ok(Box::new((*self).lookup(rb, cx)?))
    }
}

/// A member after it has been read through a handle.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolved {
    /// A scalar, unchanged.
    Scalar(ConstValue),
    /// A hardware value situated in the handle's context.
    Hardware(ValueId),
    /// A handle over a child module or instantiable object.
    Instance(Instance),
    /// A memory situated in the handle's context.
    Memory(MemoryId),
    /// A structural target situated in the handle's context.
    Target(Target),
    /// An ordered container.
    List(Vec<Resolved>),
    /// An optional member.
    Optional(Option<Box<Resolved>>),
    /// One of two members.
    Either(Either<Box<Resolved>, Box<Resolved>>),
    /// Two members.
    Pair(Box<Resolved>, Box<Resolved>),
}

impl Resolved {
    /// Returns the hardware value, if this is one.
    pub fn as_hardware(&self) -> Option<ValueId> {
        match self {
            Resolved::Hardware(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the memory, if this is one.
    pub fn as_memory(&self) -> Option<MemoryId> {
        match self {
            Resolved::Memory(m) => Some(*m),
            _ => None,
        }
    }

    /// Consumes `self` and returns the instance handle, if this is one.
    pub fn into_instance(self) -> Option<Instance> {
        match self {
            Resolved::Instance(i) => Some(i),
            _ => None,
        }
    }
}

impl Lookupable for Member {
    type Output = Resolved;

    fn lookup(self, rb: &mut Rebaser<'_>, cx: &mut LookupCx<'_>) -> RebaseResult<Resolved> {
        Ok(match self {
            Member::Scalar(c) => Resolved::Scalar(c),
            Member::Hardware(v) => Resolved::Hardware(v.lookup(rb, cx)?),
            Member::Module(m) => Resolved::Instance(m.lookup(rb, cx)?),
            Member::Instantiable(obj) => Resolved::Instance(obj.lookup(rb, cx)?),
            Member::Memory(m) => Resolved::Memory(m.lookup(rb, cx)?),
            Member::Target(t) => Resolved::Target(t.lookup(rb, cx)?),
            Member::List(items) => Resolved::List(items.lookup(rb, cx)?),
            Member::Optional(item) => Resolved::Optional(item.lookup(rb, cx)?),
            Member::Either(either) => Resolved::Either(either.lookup(rb, cx)?),
            Member::Pair(x, y) => {
                let (x, y) = (x, y).lookup(rb, cx)?;
                Resolved::Pair(x, y)
            }
            Member::Opaque { type_name } => {
                let name = cx
                    .member
                    .map(|ident| rb.tree().resolve(ident).to_string())
                    .unwrap_or_else(|| "<anonymous>".to_string());
                return Err(RebaseError::UnsupportedMember { name, type_name });
            }
        })
    }
}
