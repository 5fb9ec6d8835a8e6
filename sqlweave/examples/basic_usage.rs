use sqlweave::{op, table, values, Action, Column, Db, Result, SqliteDb};

fn main() -> Result<()> {
    println!("=== sqlweave - Basic Usage ===\n");

    // Compiling without a database
    let builder = table("user")
        .where_(("age", op::GTE, 18))
        .where_(("status", "active"))
        .order_by_desc("age")
        .limit(10);

    let select = builder.compile(Action::Select)?;
    println!("1. Deferred SELECT:");
    println!("   SQL: {}", select.sql());
    println!("   Parameters: {:?}\n", select.params());

    let delete = builder.compile(Action::Delete)?;
    println!("2. Same fragments as DELETE:");
    println!("   SQL: {}\n", delete.sql());

    // Running against SQLite
    let db = SqliteDb::in_memory()?;
    db.execute(
        "CREATE TABLE user (id INTEGER PRIMARY KEY AUTOINCREMENT, name TEXT, age INTEGER, status TEXT)",
        &[],
    )?;

    for (name, age) in [("shi", 17), ("wang", 25), ("li", 40)] {
        let id = table("user")
            .value(values! { "name" => name, "age" => age, "status" => "active" })
            .insert(&db)?;
        println!("3. Inserted {} with id {}", name, id);
    }

    println!("\n4. Matching rows: {}", builder.count(&db)?);
    for record in builder.find_all(&db)? {
        println!("   {}", serde_json::to_string(&record)?);
    }

    let updated = table("user").set("status", "inactive").where_(("name", "li")).update(&db)?;
    println!("\n5. Updated: {}", updated);

    let stats = table("user")
        .select(("status", Column::count_all().as_alias("total")))
        .group_by("status")
        .order_by_asc("status")
        .find_all(&db)?;
    println!("6. Per status:");
    for record in stats {
        println!("   {}", serde_json::to_string(&record)?);
    }

    Ok(())
}
