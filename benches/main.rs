#[macro_use]
extern crate criterion;


criterion_group!(
    benches,
    crate::btreemap::insert,
    crate::btreemap::rand_access,
    crate::skiplist::insert,
    crate::skiplist::insert_sequential,
    crate::skiplist::rand_access,
    crate::skiplist::concurrent_read,
    crate::skiplist::iter,
    crate::skiplist::dump,
);
criterion_main!(benches);
