// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

use crate::{noon, BlogFixture};

use anyhow::Result;
use pretty_assertions::assert_eq;
use tumblog::{DateAddress, Granularity};

fn populated() -> Result<BlogFixture> {
    let fixture = BlogFixture::new(noon(2002, 6, 15))?;
    fixture.post(1999, 11, 30, "a")?;
    fixture.post(2000, 1, 3, "b")?;
    fixture.post(2000, 1, 3, "c")?;
    fixture.post(2000, 3, 1, "d")?;
    fixture.post(2002, 6, 15, "e")?;

    Ok(fixture)
}

#[test]
fn no_neighbours_beyond_bounds() -> Result<()> {
    let fixture = populated()?;
    let blog = fixture.blog();
    let navigator = blog.navigator();

    let first = blog.first().unwrap();
    let last = blog.last().unwrap();
    assert_eq!(first, DateAddress::new(1999, 11, 30, 1));
    assert_eq!(last, DateAddress::new(2002, 6, 15, 1));

    assert_eq!(navigator.previous(first, Granularity::Day)?, None);
    assert_eq!(navigator.previous(first, Granularity::Part)?, None);
    assert_eq!(navigator.next(last, Granularity::Day)?, None);
    assert_eq!(navigator.next(last, Granularity::Part)?, None);

    Ok(())
}

#[test]
fn steps_skip_empty_units() -> Result<()> {
    let fixture = populated()?;
    let blog = fixture.blog();
    let navigator = blog.navigator();

    let current = DateAddress::new(2000, 3, 1, 1);
    assert_eq!(
        navigator.previous(current, Granularity::Day)?,
        Some(DateAddress::new(2000, 1, 3, 1))
    );
    assert_eq!(
        navigator.previous(current, Granularity::Part)?,
        Some(DateAddress::new(2000, 1, 3, 2))
    );
    assert_eq!(
        navigator.next(current, Granularity::Month)?,
        Some(DateAddress::new(2002, 6, 1, 1))
    );
    assert_eq!(
        navigator.next(DateAddress::new(1999, 11, 30, 1), Granularity::Year)?,
        Some(DateAddress::new(2000, 1, 1, 1))
    );

    Ok(())
}

#[test]
fn part_steps_visit_every_entry() -> Result<()> {
    let fixture = populated()?;
    let blog = fixture.blog();
    let navigator = blog.navigator();

    let mut visited = Vec::new();
    let mut current = blog.first();
    while let Some(when) = current {
        visited.push(when);
        current = navigator.next(when, Granularity::Part)?;
    }

    let expect: Vec<_> = blog
        .read_forward(DateAddress::new(1999, 1, 1, 1), 100)?
        .into_iter()
        .map(|entry| entry.when)
        .collect();
    assert_eq!(visited, expect);

    Ok(())
}

#[test]
fn ceiling_follows_now() -> Result<()> {
    let fixture = populated()?;
    let earlier = fixture.reopen(noon(2001, 1, 1))?;
    let navigator = earlier.navigator();

    assert_eq!(
        navigator.next(DateAddress::new(2000, 3, 1, 1), Granularity::Day)?,
        None
    );
    assert_eq!(
        navigator.previous(DateAddress::new(2002, 6, 15, 1), Granularity::Day)?,
        Some(DateAddress::new(2000, 3, 1, 1))
    );

    Ok(())
}
