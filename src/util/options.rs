use crate::util::constants::DEFAULT_MAX_STACK_FRAMES;
use std::default::Default;
use strum_macros::{Display, EnumString};

/// What the compactor writes into the words it reclaims.
#[derive(Copy, Clone, Debug, PartialEq, Eq, EnumString, Display)]
pub enum DeadSpaceTreatment {
    /// Fill reclaimed words with [`crate::util::constants::POISON_WORD`].
    Poison,
    /// Fill reclaimed words with zero.
    Zero,
    /// Leave stale block contents in place.
    Keep,
}

fn always_valid<T>(_: &T) -> bool {
    true
}

macro_rules! options {
    ($($name:ident: $type:ty[$validator:expr] = $default:expr),*,) => [
        options!($($name: $type[$validator] = $default),*);
    ];
    ($($name:ident: $type:ty[$validator:expr] = $default:expr),*) => [
        #[derive(Clone, Debug)]
        pub struct Options {
            $(pub $name: $type),*
        }
        impl Options {
            /// Set an option by its snake_case name. Returns false (and keeps the old
            /// value) if the key is unknown, or the value cannot be parsed or validated.
            pub fn set_from_str(&mut self, s: &str, val: &str) -> bool {
                match s {
                    // Parse the given value from str (by env vars or by calling process()) to the right type
                    $(stringify!($name) => if let Ok(ref val) = val.parse::<$type>() {
                        // Validate
                        let validate_fn = $validator;
                        let is_valid = validate_fn(val);
                        if is_valid {
                            // Only set value if valid.
                            self.$name = val.clone();
                        } else {
                            warn!("unable to set {}={:?}. Invalid value. Default value will be used.", s, val);
                        }
                        is_valid
                    } else {
                        warn!("unable to set {}={:?}. Cant parse value. Default value will be used.", s, val);
                        false
                    })*
                    _ => {
                        warn!("unknown option {}", s);
                        false
                    }
                }
            }
        }
        impl Default for Options {
            fn default() -> Self {
                let mut options = Options {
                    $($name: $default),*
                };

                // If we have env vars that start with TAGHEAP_ and match any option (such as TAGHEAP_VERIFY_HEAP),
                // we set the option to its value (if it is a valid value). Otherwise, use the default value.
                const PREFIX: &str = "TAGHEAP_";
                for (key, val) in std::env::vars() {
                    // strip the prefix, and get the lower case string
                    if let Some(rest_of_key) = key.strip_prefix(PREFIX) {
                        let lowercase: &str = &rest_of_key.to_lowercase();
                        match lowercase {
                            $(stringify!($name) => { options.set_from_str(lowercase, &val); },)*
                            _ => {}
                        }
                    }
                }
                options
            }
        }
    ]
}

options! {
    // What to write into the heap words reclaimed by compaction.
    dead_space:         DeadSpaceTreatment [always_valid] = DeadSpaceTreatment::Poison,
    // Run the sanity checker after every collection.
    verify_heap:        bool               [always_valid] = false,
    // Dump every heap word at trace level before and after each collection.
    heap_dump:          bool               [always_valid] = false,
    // Stop the root scan after this many frames. Only a corrupt frame chain gets near it.
    max_stack_frames:   usize              [|v: &usize| *v > 0] = DEFAULT_MAX_STACK_FRAMES,
}

impl Options {
    /// Set an option by its camelCase name (e.g. `verifyHeap`), as used across the C boundary.
    pub fn set_from_camelcase_str(&mut self, s: &str, val: &str) -> bool {
        trace!("Trying to process option pair: ({}, {})", s, val);

        let mut sr = String::with_capacity(s.len());
        for c in s.chars() {
            if c.is_uppercase() {
                sr.push('_');
                for c in c.to_lowercase() {
                    sr.push(c);
                }
            } else {
                sr.push(c)
            }
        }

        let result = self.set_from_str(sr.as_str(), val);

        if result {
            trace!("Validation passed");
        } else {
            trace!("Validation failed")
        }
        result
    }
}
