//! When steps for task store BDD scenarios.

use super::world::{TaskStoreWorld, run_async};
use eyre::WrapErr;
use rstest_bdd_macros::when;
use taskstore::task::domain::TaskId;

#[when(r#"a task named "{name}" is created with completed {completed}"#)]
fn create_task(world: &mut TaskStoreWorld, name: String, completed: bool) {
    let result = run_async(world.store.create_task(name, completed));
    world.last_create_result = Some(result);
}

#[when(r#"the task named "{name}" is marked completed"#)]
fn mark_completed(world: &mut TaskStoreWorld, name: String) -> Result<(), eyre::Report> {
    let task = world.task_named(&name)?;
    run_async(world.store.update_task(task.id(), true)).wrap_err("update task")?;
    Ok(())
}

#[when(r#"the task named "{name}" is deleted"#)]
fn delete_named(world: &mut TaskStoreWorld, name: String) -> Result<(), eyre::Report> {
    let task = world.task_named(&name)?;
    run_async(world.store.delete_task(task.id())).wrap_err("delete task")?;
    Ok(())
}

#[when("the task with id {id:i32} is deleted")]
fn delete_by_id(world: &mut TaskStoreWorld, id: i32) -> Result<(), eyre::Report> {
    run_async(world.store.delete_task(TaskId::new(id))).wrap_err("delete missing task")?;
    Ok(())
}
