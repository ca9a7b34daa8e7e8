#[cfg(test)]
mod tests {
    use crate::utils::{
        FEED_ITEMS, engine_with, feed_item, feed_items, feed_items_by, ints, scroll_to_end,
        sequential_engine, values,
    };
    use connectors::source::ScrollSource;
    use engine_core::{error::ScrollError, page::ScrollOptions};
    use model::{
        core::{data_type::DataType, value::Value},
        pagination::cursor::{Cursor, CursorInput, CursorOptions, SortDirection, TokenEncoding},
        records::row::RowData,
    };
    use planner::query::{ast::common::OrderDir, builder::select::SelectBuilder, ident};
    use std::ops::ControlFlow;
    use tracing_test::traced_test;

    fn ids(records: &[RowData]) -> Vec<Value> {
        records.iter().map(|r| r.get_value("id")).collect()
    }

    /// 25 records whose `n` repeats every four ids.
    fn duplicated() -> Vec<RowData> {
        (1..=25).map(|id| feed_item(id, Some(id % 4))).collect()
    }

    fn sorted_by_n_then_id(mut rows: Vec<RowData>, dir: OrderDir) -> Vec<Value> {
        rows.sort_by(|a, b| {
            let ord = a
                .get_value("n")
                .sort_cmp(&b.get_value("n"))
                .then_with(|| a.get_value("id").sort_cmp(&b.get_value("id")));
            match dir {
                OrderDir::Asc => ord,
                OrderDir::Desc => ord.reverse(),
            }
        });
        ids(&rows)
    }

    #[traced_test]
    #[tokio::test]
    async fn ten_records_forward_then_back() {
        let engine = sequential_engine(10).await;
        let select = feed_items_by("n", OrderDir::Asc);

        let first = engine
            .scroll(select.clone(), CursorInput::default(), &ScrollOptions::default().limit(5))
            .await
            .unwrap();
        assert_eq!(values(&first, "n"), ints(0..5));

        let second = engine
            .scroll(
                select.clone(),
                first.next_cursor.clone().unwrap().into(),
                &ScrollOptions::default().limit(5),
            )
            .await
            .unwrap();
        assert_eq!(values(&second, "n"), ints(5..10));

        let back = engine
            .scroll(
                select,
                second.previous_cursor.clone().unwrap().into(),
                &ScrollOptions::default().limit(2),
            )
            .await
            .unwrap();
        assert_eq!(values(&back, "n"), ints(3..5));
        assert!(logs_contain("Backward scroll"));
    }

    #[traced_test]
    #[tokio::test]
    async fn backward_from_next_page_reproduces_the_page() {
        let engine = engine_with(duplicated()).await;
        let options = ScrollOptions::default().limit(4);

        for dir in [OrderDir::Asc, OrderDir::Desc] {
            let select = feed_items_by("n", dir);
            let page = engine
                .scroll(select.clone(), CursorInput::default(), &options)
                .await
                .unwrap();
            let next = engine
                .scroll(select.clone(), page.next_cursor.clone().unwrap().into(), &options)
                .await
                .unwrap();
            let back = engine
                .scroll(select, next.previous_cursor.clone().unwrap().into(), &options)
                .await
                .unwrap();

            assert_eq!(back.records, page.records, "{dir:?}");
        }
    }

    #[traced_test]
    #[tokio::test]
    async fn exhaustive_scroll_visits_every_record_once_with_duplicate_values() {
        let engine = engine_with(duplicated()).await;

        for dir in [OrderDir::Asc, OrderDir::Desc] {
            for limit in [1, 3, 4, 7, 25, 30] {
                let records = scroll_to_end(&engine, &feed_items_by("n", dir), limit)
                    .await
                    .unwrap();
                assert_eq!(
                    ids(&records),
                    sorted_by_n_then_id(duplicated(), dir),
                    "{dir:?} limit {limit}"
                );
            }
        }
    }

    #[traced_test]
    #[tokio::test]
    async fn backward_scroll_to_start_visits_every_record_once() {
        let engine = engine_with(duplicated()).await;
        let select = feed_items_by("n", OrderDir::Desc);
        let options = ScrollOptions::default().limit(3).previous(true);

        let mut cursor = CursorInput::default();
        let mut pages = Vec::new();
        loop {
            let page = engine.scroll(select.clone(), cursor, &options).await.unwrap();
            let Some(previous) = page.previous_cursor else {
                break;
            };
            pages.push(page.records);
            cursor = previous.into();
        }

        let records = pages.into_iter().rev().flatten().collect::<Vec<_>>();
        assert_eq!(ids(&records), sorted_by_n_then_id(duplicated(), OrderDir::Desc));
    }

    fn projected_by_n(dir: OrderDir) -> planner::query::ast::select::Select {
        SelectBuilder::new()
            .select(vec![ident("id")])
            .from(planner::table_ref!(FEED_ITEMS), None)
            .order_by(ident("n"), Some(dir))
            .build()
    }

    #[traced_test]
    #[tokio::test]
    async fn projected_queries_scroll_to_the_end_in_both_directions() {
        let engine = engine_with(duplicated()).await;

        for dir in [OrderDir::Asc, OrderDir::Desc] {
            let records = scroll_to_end(&engine, &projected_by_n(dir), 2).await.unwrap();
            assert_eq!(ids(&records), sorted_by_n_then_id(duplicated(), dir), "{dir:?}");
            assert!(records.iter().all(|r| r.get("n").is_some()), "{dir:?}");
        }
    }

    #[traced_test]
    #[tokio::test]
    async fn projected_queries_scroll_back_to_the_start() {
        let engine = engine_with(duplicated()).await;
        let options = ScrollOptions::default().limit(3).previous(true);

        for dir in [OrderDir::Asc, OrderDir::Desc] {
            let select = projected_by_n(dir);
            let mut cursor = CursorInput::default();
            let mut pages = Vec::new();
            loop {
                let page = engine.scroll(select.clone(), cursor, &options).await.unwrap();
                let Some(previous) = page.previous_cursor else {
                    break;
                };
                assert!(!previous.value().is_null(), "{dir:?}");
                pages.push(page.records);
                cursor = previous.into();
            }

            let records = pages.into_iter().rev().flatten().collect::<Vec<_>>();
            assert_eq!(ids(&records), sorted_by_n_then_id(duplicated(), dir), "{dir:?}");
        }
    }

    #[traced_test]
    #[tokio::test]
    async fn unordered_queries_scroll_by_id_ascending() {
        let rows = [5, 2, 9, 1, 7].map(|id| feed_item(id, Some(10 - id))).to_vec();
        let engine = engine_with(rows).await;

        let implicit = scroll_to_end(&engine, &feed_items(), 2).await.unwrap();
        let explicit = scroll_to_end(&engine, &feed_items_by("id", OrderDir::Asc), 2)
            .await
            .unwrap();

        assert_eq!(ids(&implicit), ints([1, 2, 5, 7, 9]));
        assert_eq!(implicit, explicit);
        assert!(logs_contain("defaulting to id asc"));
    }

    #[traced_test]
    #[tokio::test]
    async fn two_sort_fields_are_rejected() {
        let engine = sequential_engine(3).await;
        let select = SelectBuilder::new()
            .select(vec![])
            .from(planner::table_ref!(FEED_ITEMS), None)
            .order_by(ident("n"), Some(OrderDir::Asc))
            .order_by(ident("embed_id"), Some(OrderDir::Desc))
            .build();

        let err = engine
            .scroll(select, CursorInput::default(), &ScrollOptions::default())
            .await
            .unwrap_err();

        assert!(matches!(
            &err,
            ScrollError::MultipleSortFields { fields } if fields == &["n", "embed_id"]
        ));
        assert!(err.to_string().contains("n, embed_id"));
    }

    #[traced_test]
    #[tokio::test]
    async fn cursors_from_another_ordering_are_rejected() {
        let engine = sequential_engine(3).await;
        let descending = Cursor::new(
            Value::Int(1),
            Value::Int(2),
            &CursorOptions::new("n", DataType::Int, SortDirection::Desc),
        )
        .unwrap();
        let other_field = Cursor::new(
            Value::Int(1),
            Value::Int(2),
            &CursorOptions::new("embed_id", DataType::Int, SortDirection::Asc),
        )
        .unwrap();

        for cursor in [descending, other_field] {
            let err = engine
                .scroll(
                    feed_items_by("n", OrderDir::Asc),
                    cursor.into(),
                    &ScrollOptions::default(),
                )
                .await
                .unwrap_err();
            assert!(matches!(err, ScrollError::MismatchedSortFields { .. }), "{err}");
        }
    }

    #[traced_test]
    #[tokio::test]
    async fn base64_cursors_carry_their_ordering() {
        let engine = sequential_engine(6).await;
        let options = ScrollOptions::default().limit(2);
        let page = engine
            .scroll(
                feed_items_by("n", OrderDir::Desc),
                CursorInput::Start(TokenEncoding::Base64),
                &options,
            )
            .await
            .unwrap();
        let token = page.next_cursor.unwrap().encode();

        let err = engine
            .scroll(
                feed_items_by("n", OrderDir::Asc),
                CursorInput::Base64(token.clone()),
                &options,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ScrollError::MismatchedSortFields { .. }));

        let next = engine
            .scroll(
                feed_items_by("n", OrderDir::Desc),
                CursorInput::Base64(token),
                &options,
            )
            .await
            .unwrap();
        assert_eq!(values(&next, "n"), ints([3, 2]));
    }

    #[traced_test]
    #[tokio::test]
    async fn issued_tokens_round_trip_in_both_encodings() {
        let engine = engine_with(duplicated()).await;
        let select = feed_items_by("n", OrderDir::Desc);

        for encoding in [TokenEncoding::Plain, TokenEncoding::Base64] {
            let page = engine
                .scroll(
                    select.clone(),
                    CursorInput::Start(encoding),
                    &ScrollOptions::default().limit(5),
                )
                .await
                .unwrap();

            for cursor in [page.next_cursor.unwrap(), page.previous_cursor.unwrap()] {
                let options = CursorOptions::new("n", DataType::Int, SortDirection::Desc)
                    .previous(cursor.is_previous());
                let decoded = CursorInput::token(cursor.encode(), encoding)
                    .resolve(&options)
                    .unwrap();
                assert_eq!(decoded, cursor);
            }
        }
    }

    #[traced_test]
    #[tokio::test]
    async fn plain_previous_tokens_need_the_previous_option() {
        let engine = sequential_engine(10).await;
        let select = feed_items_by("n", OrderDir::Asc);
        let token = "6:7".to_string();

        let forward = engine
            .scroll(
                select.clone(),
                CursorInput::Plain(token.clone()),
                &ScrollOptions::default().limit(2),
            )
            .await
            .unwrap();
        let backward = engine
            .scroll(
                select,
                CursorInput::Plain(token),
                &ScrollOptions::default().limit(2).previous(true),
            )
            .await
            .unwrap();

        assert_eq!(values(&forward, "n"), ints([7, 8]));
        assert_eq!(values(&backward, "n"), ints([4, 5]));
    }

    #[traced_test]
    #[tokio::test]
    async fn unlimited_backward_scroll_behaves_like_a_forward_fetch() {
        let engine = sequential_engine(10).await;
        let select = feed_items_by("n", OrderDir::Asc);
        let previous = Cursor::new(
            Value::Int(4),
            Value::Int(5),
            &CursorOptions::new("n", DataType::Int, SortDirection::Asc).previous(true),
        )
        .unwrap();

        let page = engine
            .scroll(select, previous.into(), &ScrollOptions::default())
            .await
            .unwrap();

        assert_eq!(values(&page, "n"), ints(0..4));
        assert!(!logs_contain("Backward scroll"));
    }

    #[traced_test]
    #[tokio::test]
    async fn empty_previous_cursor_returns_the_last_records() {
        let engine = sequential_engine(10).await;
        let page = engine
            .scroll(
                feed_items_by("n", OrderDir::Asc),
                CursorInput::default(),
                &ScrollOptions::default().limit(3).previous(true),
            )
            .await
            .unwrap();

        assert_eq!(values(&page, "n"), ints(7..10));
    }

    #[traced_test]
    #[tokio::test]
    async fn empty_pages_have_no_cursors() {
        let engine = sequential_engine(3).await;
        let page = engine
            .scroll(
                feed_items_by("n", OrderDir::Asc),
                CursorInput::Plain("2:3".into()),
                &ScrollOptions::default().limit(5),
            )
            .await
            .unwrap();

        assert!(page.is_empty());
        assert_eq!(page.next_cursor, None);
        assert_eq!(page.previous_cursor, None);
    }

    #[traced_test]
    #[tokio::test]
    async fn streaming_can_stop_mid_page_and_resume() {
        let engine = sequential_engine(10).await;
        let select = feed_items_by("n", OrderDir::Asc);
        let options = ScrollOptions::default().limit(5);

        let mut delivered = Vec::new();
        let stopped = engine
            .scroll_each(select.clone(), CursorInput::default(), &options, |record, _| {
                delivered.push(record.get_value("n"));
                if delivered.len() == 2 {
                    ControlFlow::Break(())
                } else {
                    ControlFlow::Continue(())
                }
            })
            .await
            .unwrap()
            .unwrap();
        assert_eq!(delivered, ints([0, 1]));
        assert!(logs_contain("stopped early"));

        let mut rest = Vec::new();
        engine
            .scroll_each(select, stopped.next_cursor.into(), &options, |record, it| {
                rest.push(record.get_value("n"));
                assert_eq!(it.previous_cursor.value(), &Value::Int(2));
                ControlFlow::Continue(())
            })
            .await
            .unwrap();
        assert_eq!(rest, ints(2..7));
    }

    #[traced_test]
    #[tokio::test]
    async fn null_sort_values_are_scrolled_like_any_other() {
        let rows = vec![
            feed_item(1, Some(2)),
            feed_item(2, None),
            feed_item(3, Some(1)),
            feed_item(4, None),
            feed_item(5, Some(2)),
        ];
        let engine = engine_with(rows.clone()).await;

        for dir in [OrderDir::Asc, OrderDir::Desc] {
            let records = scroll_to_end(&engine, &feed_items_by("n", dir), 2)
                .await
                .unwrap();
            assert_eq!(ids(&records), sorted_by_n_then_id(rows.clone(), dir), "{dir:?}");
        }
    }

    #[traced_test]
    #[tokio::test]
    async fn foreign_keys_compare_as_identifiers() {
        let engine = sequential_engine(6).await;
        let page = engine
            .scroll(
                feed_items_by("embed_id", OrderDir::Asc),
                CursorInput::Plain("96:4".into()),
                &ScrollOptions::default().limit(2),
            )
            .await
            .unwrap();

        assert_eq!(values(&page, "embed_id"), ints([97, 98]));
        assert_eq!(page.next_cursor.unwrap().field_type(), DataType::Int);
    }

    #[traced_test]
    #[tokio::test]
    async fn records_changed_behind_a_cursor_do_not_shift_later_pages() {
        let engine = sequential_engine(10).await;
        let select = feed_items_by("n", OrderDir::Asc);
        let options = ScrollOptions::default().limit(3);

        let first = engine
            .scroll(select.clone(), CursorInput::default(), &options)
            .await
            .unwrap();
        let next = first.next_cursor.unwrap();

        let source = engine.source();
        source.delete(FEED_ITEMS, &Value::Int(1)).await.unwrap();
        source.insert(FEED_ITEMS, feed_item(11, Some(-1))).await.unwrap();
        source.insert(FEED_ITEMS, feed_item(12, Some(4))).await.unwrap();

        let second = engine.scroll(select, next.into(), &options).await.unwrap();
        assert_eq!(ids(&second.records), ints([4, 5, 12]));
        assert_eq!(source.metadata(FEED_ITEMS).await.unwrap().id_field, "id");
    }
}
