//! Macros for per-state and per-transition accessors.

/// Generate named accessors on an entity type.
///
/// Each entry maps a method name to one of the machine's parametrized
/// operations:
///
/// - `is("state")` becomes `fn(&self, &Machine<Self>) -> bool`
/// - `can("transition")` becomes `fn(&self, &Machine<Self>, Option<&str>) -> bool`
/// - `transition("transition")` becomes
///   `fn(&mut self, &Machine<Self>, &mut impl Persistence<Self>, Option<&str>) -> Result<bool, MachineError>`
///
/// # Example
///
/// ```
/// use machinist::accessors;
/// use machinist::builder::MachineBuilder;
/// use machinist::core::{EntityState, StatefulEntity};
/// use machinist::guard::RolePredicates;
/// use machinist::listeners::LifecycleHooks;
/// use machinist::store::MemoryStore;
///
/// #[derive(Clone, Default)]
/// struct Vehicle {
///     state: EntityState,
/// }
///
/// impl StatefulEntity for Vehicle {
///     fn state(&self) -> &EntityState {
///         &self.state
///     }
///
///     fn state_mut(&mut self) -> &mut EntityState {
///         &mut self.state
///     }
/// }
///
/// impl LifecycleHooks for Vehicle {}
/// impl RolePredicates for Vehicle {}
///
/// accessors! {
///     impl Vehicle {
///         is_parked => is("parked"),
///         can_ignite => can("ignite"),
///         ignite => transition("ignite"),
///     }
/// }
///
/// let machine = MachineBuilder::<Vehicle>::new("vehicle")
///     .initial("parked")
///     .transition("ignite", [("parked", "idling")])
///     .build()
///     .unwrap();
///
/// let mut vehicle = Vehicle { state: EntityState::new("parked") };
/// let mut store = MemoryStore::new();
///
/// assert!(vehicle.is_parked(&machine));
/// assert!(vehicle.can_ignite(&machine, None));
/// assert_eq!(vehicle.ignite(&machine, &mut store, None), Ok(true));
/// assert!(!vehicle.is_parked(&machine));
/// ```
#[macro_export]
macro_rules! accessors {
    (
        $(#[$meta:meta])*
        impl $entity:ty {
            $( $method:ident => $kind:ident ( $target:literal ) ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        impl $entity {
            $( $crate::accessors!(@method $kind $method $target); )*
        }
    };

    (@method is $method:ident $state:literal) => {
        pub fn $method(&self, machine: &$crate::machine::Machine<Self>) -> bool {
            machine.is(self, $state)
        }
    };

    (@method can $method:ident $transition:literal) => {
        pub fn $method(
            &self,
            machine: &$crate::machine::Machine<Self>,
            role: ::std::option::Option<&str>,
        ) -> bool {
            machine.can(self, $transition, role)
        }
    };

    (@method transition $method:ident $transition:literal) => {
        pub fn $method<P>(
            &mut self,
            machine: &$crate::machine::Machine<Self>,
            store: &mut P,
            role: ::std::option::Option<&str>,
        ) -> ::std::result::Result<bool, $crate::machine::MachineError>
        where
            P: $crate::machine::Persistence<Self>,
        {
            machine.transition(self, store, $transition, role)
        }
    };
}

#[cfg(test)]
mod tests {
    use crate::builder::MachineBuilder;
    use crate::core::{EntityState, StatefulEntity};
    use crate::guard::{Predicate, RolePredicates, TransitionRule};
    use crate::listeners::LifecycleHooks;
    use crate::machine::MachineError;
    use crate::store::MemoryStore;

    #[derive(Clone, Default)]
    struct Vehicle {
        state: EntityState,
        has_key: bool,
    }

    impl StatefulEntity for Vehicle {
        fn state(&self) -> &EntityState {
            &self.state
        }

        fn state_mut(&mut self) -> &mut EntityState {
            &mut self.state
        }
    }

    impl Vehicle {
        fn holds_key(&self, _role: &str) -> bool {
            self.has_key
        }
    }

    impl LifecycleHooks for Vehicle {}

    impl RolePredicates for Vehicle {
        fn predicate(name: &str) -> Option<Predicate<Self>> {
            match name {
                "has_key" => Some(Vehicle::holds_key),
                _ => None,
            }
        }
    }

    accessors! {
        impl Vehicle {
            is_parked => is("parked"),
            is_idling => is("idling"),
            can_ignite => can("ignite"),
            can_turn_off => can("turn_off"),
            ignite => transition("ignite"),
            turn_off => transition("turn_off"),
        }
    }

    fn machine() -> crate::machine::Machine<Vehicle> {
        MachineBuilder::new("vehicle")
            .initial("parked")
            .transition("ignite", [("parked", "idling")])
            .transition("turn_off", [("all", "parked")])
            .rule("ignite", TransitionRule::new(["driver"]).depends_on("has_key"))
            .build()
            .unwrap()
    }

    #[test]
    fn accessors_delegate_to_the_machine() {
        let machine = machine();
        let mut store = MemoryStore::new();
        let mut vehicle = Vehicle {
            state: EntityState::new("parked"),
            has_key: true,
        };

        assert!(vehicle.is_parked(&machine));
        assert!(vehicle.can_ignite(&machine, Some("driver")));
        assert_eq!(vehicle.ignite(&machine, &mut store, Some("driver")), Ok(true));
        assert!(vehicle.is_idling(&machine));
        assert!(vehicle.can_turn_off(&machine, None));
        assert_eq!(vehicle.turn_off(&machine, &mut store, None), Ok(true));
        assert!(vehicle.is_parked(&machine));
    }

    #[test]
    fn guarded_accessor_needs_a_role() {
        let machine = machine();
        let mut store = MemoryStore::new();
        let mut vehicle = Vehicle {
            state: EntityState::new("parked"),
            has_key: false,
        };

        assert!(!vehicle.can_ignite(&machine, Some("driver")));
        assert_eq!(
            vehicle.ignite(&machine, &mut store, None),
            Err(MachineError::RoleRequired {
                transition: "ignite".to_string()
            })
        );
    }
}
