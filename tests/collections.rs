/*!
 * Collection tests entry point
 */

#[path = "collections/map_test.rs"]
mod map_test;

#[path = "collections/set_test.rs"]
mod set_test;

#[path = "collections/queue_test.rs"]
mod queue_test;

#[path = "collections/snapshot_test.rs"]
mod snapshot_test;

#[path = "collections/model_test.rs"]
mod model_test;
