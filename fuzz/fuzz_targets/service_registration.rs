#![no_main]

use libfuzzer_sys::fuzz_target;
use scopewire::{Container, Lifetime, Resolver};
use std::sync::Arc;

struct TestService {
    value: u8,
}

// Each byte is one registration: low two bits pick the lifetime, the rest is
// the value. The last registration must always win.
fuzz_target!(|data: &[u8]| {
    if data.is_empty() {
        return;
    }

    let mut container = Container::new();
    let mut expected = None;
    for &byte in data.iter().take(64) {
        let value = byte >> 2;
        let handle = container.register_factory(move |_| TestService { value });
        let lifetime = match byte & 0b11 {
            0 => Lifetime::Transient,
            1 => {
                handle.as_singleton();
                Lifetime::Singleton
            }
            _ => {
                handle.per_scope();
                Lifetime::PerScope
            }
        };
        expected = Some((value, lifetime));
    }

    let Some((value, lifetime)) = expected else {
        return;
    };
    assert_eq!(container.descriptors().len(), 1);
    assert_eq!(container.descriptors()[0].lifetime, lifetime);

    let scope = container.create_scope();
    let a = scope.resolve::<TestService>().unwrap();
    let b = scope.resolve::<TestService>().unwrap();
    assert_eq!(a.value, value);
    assert_eq!(Arc::ptr_eq(&a, &b), lifetime.is_cached());
});
