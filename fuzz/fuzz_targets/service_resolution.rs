#![no_main]

use libfuzzer_sys::fuzz_target;
use scopewire::{Container, DiError, Resolver, TypeDescriptor};
use std::sync::Arc;

struct Leaf;
struct Branch {
    _leaf: Arc<Leaf>,
}

// Drives a random sequence of scope operations against a fixed graph and
// checks that resolution only ever fails the documented ways.
fuzz_target!(|data: &[u8]| {
    if data.len() < 2 {
        return;
    }

    let mut container = Container::new();
    if data[0] & 1 == 1 {
        container.register_factory(|_| Leaf).per_scope();
    }
    let branch = container
        .register_type(
            TypeDescriptor::<Branch>::new()
                .public_constructor()
                .param::<Leaf>()
                .build(|args| Ok(Branch { _leaf: args.next()? })),
        )
        .unwrap();
    if data[0] & 2 == 2 {
        branch.as_singleton();
    }

    let mut scopes = vec![container.create_scope()];
    for &op in &data[1..] {
        let index = (op >> 3) as usize % scopes.len();
        match op & 0b111 {
            0 => scopes.push(container.create_scope()),
            1 => scopes[index].dispose(),
            2 => drop(scopes.swap_remove(index)),
            3 => container.dispose(),
            _ => match scopes[index].resolve::<Branch>() {
                Ok(_) => assert!(data[0] & 1 == 1),
                Err(DiError::UnresolvedDependency { .. }) => assert!(data[0] & 1 == 0),
                Err(DiError::UseAfterDispose(_)) => {}
                Err(other) => panic!("unexpected error: {other}"),
            },
        }
        if scopes.is_empty() {
            scopes.push(container.create_scope());
        }
    }
});
