//! Identities persisted for Edit-and-Continue.
//!
//! When a method is recompiled during a debug session, the new method body has to find the
//! old body's local slots, closures, lambdas and suspension points again. Each of them is
//! identified by the syntax offset of the construct that produced it relative to the start
//! of the method body, plus an ordinal when several share that offset.

/// Largest [`SynthesizedLocalKind`] tag that can be recorded in a local slot map.
///
/// The tag is stored in the low six bits of a slot byte, offset by one; `0x3F` is reserved.
pub const MAX_SERIALIZED_LOCAL_KIND: i32 = 0x3F - 2;

/// Kind of a local slot, as recorded in the local slot map.
///
/// Negative tags are short-lived temporaries: they only live within a single statement, are
/// never matched across generations and are stored as anonymous placeholders. Non-negative
/// tags are long-lived and persisted with their [`LocalDebugId`].
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum SynthesizedLocalKind {
    /// Temp created by the code generator (-3)
    EmitterTemp,
    /// Temp created by the optimizer (-2)
    OptimizerTemp,
    /// Temp created during lowering (-1)
    LoweringTemp,
    /// A local declared in source (0)
    UserDefined,
    /// Discriminator of a conditional branch (1)
    ConditionalBranchDiscriminator,
    /// Flag tracking whether a `lock` was taken (2)
    LockTaken,
    /// Object locked by a `lock` statement (3)
    Lock,
    /// Resource of a `using` statement (4)
    Using,
    /// Enumerator of a `foreach` loop (5)
    ForEachEnumerator,
    /// Array iterated by a `foreach` loop (6)
    ForEachArray,
    /// Index into an array iterated by a `foreach` loop (7)
    ForEachArrayIndex,
    /// Upper bound of an array iterated by a `foreach` loop (8)
    ForEachArrayLimit,
    /// Pinned reference of a `fixed` statement (9)
    FixedReference,
    /// Return value of a state machine method (20)
    StateMachineReturnValue,
    /// Return value of a method with several return statements (21)
    FunctionReturnValue,
    /// Exception pending across an `await` in a `finally` (22)
    TryAwaitPendingException,
    /// Branch pending across an `await` in a `finally` (23)
    TryAwaitPendingBranch,
    /// Catch clause pending across an `await` (24)
    TryAwaitPendingCatch,
    /// Exception caught by a catch clause containing an `await` (25)
    TryAwaitPendingCaughtException,
    /// Exception hoisted out of an exception filter containing an `await` (26)
    ExceptionFilterAwaitHoistedExceptionLocal,
    /// Cached state of a state machine (27)
    StateMachineCachedState,
    /// Awaiter of an `await` expression (28)
    Awaiter,
    /// Spilled reference across an `await` (29)
    AwaitByRefSpill,
    /// Display class instance holding captured variables (30)
    LambdaDisplayClass,
    /// Temp of a pattern matching `switch` case (35)
    SwitchCasePatternMatching,
    /// A long-lived tag this crate does not name
    Unknown(u8),
}

impl SynthesizedLocalKind {
    /// Returns the numeric tag of this kind.
    #[must_use]
    pub fn value(self) -> i32 {
        match self {
            SynthesizedLocalKind::EmitterTemp => -3,
            SynthesizedLocalKind::OptimizerTemp => -2,
            SynthesizedLocalKind::LoweringTemp => -1,
            SynthesizedLocalKind::UserDefined => 0,
            SynthesizedLocalKind::ConditionalBranchDiscriminator => 1,
            SynthesizedLocalKind::LockTaken => 2,
            SynthesizedLocalKind::Lock => 3,
            SynthesizedLocalKind::Using => 4,
            SynthesizedLocalKind::ForEachEnumerator => 5,
            SynthesizedLocalKind::ForEachArray => 6,
            SynthesizedLocalKind::ForEachArrayIndex => 7,
            SynthesizedLocalKind::ForEachArrayLimit => 8,
            SynthesizedLocalKind::FixedReference => 9,
            SynthesizedLocalKind::StateMachineReturnValue => 20,
            SynthesizedLocalKind::FunctionReturnValue => 21,
            SynthesizedLocalKind::TryAwaitPendingException => 22,
            SynthesizedLocalKind::TryAwaitPendingBranch => 23,
            SynthesizedLocalKind::TryAwaitPendingCatch => 24,
            SynthesizedLocalKind::TryAwaitPendingCaughtException => 25,
            SynthesizedLocalKind::ExceptionFilterAwaitHoistedExceptionLocal => 26,
            SynthesizedLocalKind::StateMachineCachedState => 27,
            SynthesizedLocalKind::Awaiter => 28,
            SynthesizedLocalKind::AwaitByRefSpill => 29,
            SynthesizedLocalKind::LambdaDisplayClass => 30,
            SynthesizedLocalKind::SwitchCasePatternMatching => 35,
            SynthesizedLocalKind::Unknown(tag) => i32::from(tag),
        }
    }

    /// Maps a long-lived tag to its kind. Tags without a name become
    /// [`SynthesizedLocalKind::Unknown`].
    #[must_use]
    pub fn from_tag(tag: u8) -> Self {
        match tag {
            0 => SynthesizedLocalKind::UserDefined,
            1 => SynthesizedLocalKind::ConditionalBranchDiscriminator,
            2 => SynthesizedLocalKind::LockTaken,
            3 => SynthesizedLocalKind::Lock,
            4 => SynthesizedLocalKind::Using,
            5 => SynthesizedLocalKind::ForEachEnumerator,
            6 => SynthesizedLocalKind::ForEachArray,
            7 => SynthesizedLocalKind::ForEachArrayIndex,
            8 => SynthesizedLocalKind::ForEachArrayLimit,
            9 => SynthesizedLocalKind::FixedReference,
            20 => SynthesizedLocalKind::StateMachineReturnValue,
            21 => SynthesizedLocalKind::FunctionReturnValue,
            22 => SynthesizedLocalKind::TryAwaitPendingException,
            23 => SynthesizedLocalKind::TryAwaitPendingBranch,
            24 => SynthesizedLocalKind::TryAwaitPendingCatch,
            25 => SynthesizedLocalKind::TryAwaitPendingCaughtException,
            26 => SynthesizedLocalKind::ExceptionFilterAwaitHoistedExceptionLocal,
            27 => SynthesizedLocalKind::StateMachineCachedState,
            28 => SynthesizedLocalKind::Awaiter,
            29 => SynthesizedLocalKind::AwaitByRefSpill,
            30 => SynthesizedLocalKind::LambdaDisplayClass,
            35 => SynthesizedLocalKind::SwitchCasePatternMatching,
            other => SynthesizedLocalKind::Unknown(other),
        }
    }

    /// Returns `true` for kinds whose identity is persisted across generations.
    #[must_use]
    pub fn is_long_lived(self) -> bool {
        self.value() >= 0
    }
}

/// Identity of a local slot within its method.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug, Hash, Default)]
pub struct LocalDebugId {
    /// Syntax offset of the declaring construct; negative for constructs preceding the body
    pub syntax_offset: i32,
    /// Disambiguates slots declared at the same syntax offset
    pub ordinal: i32,
}

impl LocalDebugId {
    /// Creates a new [`LocalDebugId`].
    #[must_use]
    pub fn new(syntax_offset: i32, ordinal: i32) -> Self {
        LocalDebugId {
            syntax_offset,
            ordinal,
        }
    }
}

/// A single local slot of the local slot map.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub struct LocalSlotDebugInfo {
    /// What produced the slot
    pub kind: SynthesizedLocalKind,
    /// Identity of the slot; only meaningful for long-lived kinds
    pub id: LocalDebugId,
}

impl LocalSlotDebugInfo {
    /// Creates a new [`LocalSlotDebugInfo`].
    #[must_use]
    pub fn new(kind: SynthesizedLocalKind, id: LocalDebugId) -> Self {
        LocalSlotDebugInfo { kind, id }
    }

    /// The placeholder for a slot index without a persisted local.
    ///
    /// Every short-lived slot decodes to this value, keeping the indices of the slots behind
    /// it intact.
    #[must_use]
    pub fn temp() -> Self {
        LocalSlotDebugInfo {
            kind: SynthesizedLocalKind::LoweringTemp,
            id: LocalDebugId::default(),
        }
    }
}

/// Identity of a closure or lambda across Edit-and-Continue generations.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug, Hash, Default)]
pub struct DebugId {
    /// Position of the closure or lambda within its method
    pub ordinal: i32,
    /// Generation in which the closure or lambda was introduced
    pub generation: i32,
}

impl DebugId {
    /// Creates a new [`DebugId`].
    #[must_use]
    pub fn new(ordinal: i32, generation: i32) -> Self {
        DebugId {
            ordinal,
            generation,
        }
    }
}

/// A closure (display class) of a method.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub struct ClosureDebugInfo {
    /// Syntax offset of the scope the closure captures variables from
    pub syntax_offset: i32,
    /// Identity of the closure
    pub closure_id: DebugId,
}

impl ClosureDebugInfo {
    /// Creates a new [`ClosureDebugInfo`].
    #[must_use]
    pub fn new(syntax_offset: i32, closure_id: DebugId) -> Self {
        ClosureDebugInfo {
            syntax_offset,
            closure_id,
        }
    }
}

/// A lambda or local function of a method.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub struct LambdaDebugInfo {
    /// Syntax offset of the lambda body
    pub syntax_offset: i32,
    /// Identity of the lambda
    pub lambda_id: DebugId,
    /// Ordinal of the closure the lambda is emitted into, or one of
    /// [`LambdaDebugInfo::STATIC_CLOSURE_ORDINAL`] and [`LambdaDebugInfo::THIS_ONLY_CLOSURE_ORDINAL`]
    pub closure_ordinal: i32,
}

impl LambdaDebugInfo {
    /// The lambda captures nothing and is emitted as a static method.
    pub const STATIC_CLOSURE_ORDINAL: i32 = -1;

    /// The lambda only captures `this` and is emitted into the containing type.
    pub const THIS_ONLY_CLOSURE_ORDINAL: i32 = -2;

    /// Smallest valid closure ordinal.
    pub const MIN_CLOSURE_ORDINAL: i32 = LambdaDebugInfo::THIS_ONLY_CLOSURE_ORDINAL;

    /// Creates a new [`LambdaDebugInfo`].
    #[must_use]
    pub fn new(syntax_offset: i32, lambda_id: DebugId, closure_ordinal: i32) -> Self {
        LambdaDebugInfo {
            syntax_offset,
            lambda_id,
            closure_ordinal,
        }
    }
}

/// Distinguishes several await or yield points at the same syntax offset.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug, Hash, Default)]
pub struct AwaitDebugId {
    /// Position of the suspension point among those sharing its syntax offset
    pub relative_state_ordinal: i32,
}

impl AwaitDebugId {
    /// Creates a new [`AwaitDebugId`].
    #[must_use]
    pub fn new(relative_state_ordinal: i32) -> Self {
        AwaitDebugId {
            relative_state_ordinal,
        }
    }
}

/// A state number of an async or iterator state machine.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug, Hash, Default)]
pub struct StateMachineState(pub i32);

impl StateMachineState {
    /// First state an iterator uses for `finally` blocks; further ones count down.
    pub const FIRST_ITERATOR_FINALIZE_STATE: StateMachineState = StateMachineState(-3);
    /// The state machine ran to completion.
    pub const FINISHED_STATE: StateMachineState = StateMachineState(-2);
    /// The state machine has not started or is currently running.
    pub const NOT_STARTED_OR_RUNNING_STATE: StateMachineState = StateMachineState(-1);
    /// First state of an `await` resumption point.
    pub const FIRST_RESUMABLE_ASYNC_STATE: StateMachineState = StateMachineState(0);
}

/// A suspension point of a state machine and the state number it resumes in.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub struct StateMachineStateDebugInfo {
    /// Syntax offset of the `await` or `yield`
    pub syntax_offset: i32,
    /// Position among the suspension points at the same syntax offset
    pub await_id: AwaitDebugId,
    /// State number assigned to the suspension point
    pub state_number: StateMachineState,
}

impl StateMachineStateDebugInfo {
    /// Creates a new [`StateMachineStateDebugInfo`].
    #[must_use]
    pub fn new(syntax_offset: i32, await_id: AwaitDebugId, state_number: StateMachineState) -> Self {
        StateMachineStateDebugInfo {
            syntax_offset,
            await_id,
            state_number,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn named_tags_roundtrip() {
        for tag in 0..=MAX_SERIALIZED_LOCAL_KIND as u8 {
            let kind = SynthesizedLocalKind::from_tag(tag);
            assert_eq!(kind.value(), i32::from(tag));
            assert!(kind.is_long_lived());
        }
    }

    #[test]
    fn temporaries_are_short_lived() {
        assert!(!SynthesizedLocalKind::EmitterTemp.is_long_lived());
        assert!(!SynthesizedLocalKind::OptimizerTemp.is_long_lived());
        assert!(!SynthesizedLocalKind::LoweringTemp.is_long_lived());
        assert!(!LocalSlotDebugInfo::temp().kind.is_long_lived());
    }

    #[test]
    fn awaiter_tag() {
        assert_eq!(SynthesizedLocalKind::from_tag(28), SynthesizedLocalKind::Awaiter);
        assert_eq!(SynthesizedLocalKind::from_tag(12), SynthesizedLocalKind::Unknown(12));
    }
}
