//! Given steps for ordered task list BDD scenarios.

use super::world::{TaskOrderingWorld, run_async, split_names};
use eyre::WrapErr;
use rstest_bdd_macros::given;

#[given("an empty task list")]
fn empty_task_list(world: &mut TaskOrderingWorld) -> Result<(), eyre::Report> {
    let tasks = world.listed()?;
    if !tasks.is_empty() {
        return Err(eyre::eyre!("expected an empty list, found {}", tasks.len()));
    }
    Ok(())
}

#[given(r#"the tasks "{names}" exist"#)]
fn tasks_exist(world: &mut TaskOrderingWorld, names: String) -> Result<(), eyre::Report> {
    for name in split_names(&names) {
        world
            .create(name)
            .wrap_err_with(|| format!("seed task '{name}'"))?;
    }
    Ok(())
}

#[given(r#"task "{name}" has been deleted"#)]
fn task_deleted(world: &mut TaskOrderingWorld, name: String) -> Result<(), eyre::Report> {
    let id = world.id_of(&name)?;
    run_async(world.store.delete_task(id)).wrap_err("delete seeded task")?;
    Ok(())
}
