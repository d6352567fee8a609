use crate::error_code::*;

pub(super) static TABLE: &[(i32, &str)] = &[
    (CONNECTION_NOT_EXIST, "指定されたセッションが存在しません。"),
    (
        CLIENT_NOT_EXIST,
        "指定されたクライアント(ID=%1)が存在しません。",
    ),
    (CONNECTION_RAN_OUT, "コネクションが切断されました。"),
    (CONNECTION_CLOSED, "コネクションはすでにクローズされています。"),
    (SERVER_NOT_AVAILABLE, "サーバーは利用不可能です。"),
    (
        DATABASE_NOT_AVAILABLE,
        "データベース'%1'は利用不可能です。",
    ),
    (USER_NOT_FOUND, "ユーザー'%1'は存在しません。"),
    (AUTHORIZATION_FAILED, "認証に失敗しました。"),
    (SESSION_NOT_AVAILABLE, "セッションは利用不可能です。"),
    (SESSION_BUSY, "セッションは他の文を実行中です。"),
    (WORKER_CANCELED, "文の実行がキャンセルされました。"),
    (
        DYNAMIC_PARAMETER_NOT_MATCH,
        "パラメーター値の数(%1)が必要な数(%2)と一致しません。",
    ),
    (SQL_SYNTAX_ERROR, "SQL文に構文エラー'%1'があります。"),
    (
        TABLE_NOT_FOUND,
        "データベース'%2'に表'%1'は存在しません。",
    ),
    (COLUMN_NOT_FOUND, "列'%1'は存在しません。"),
    (PREPARE_FAILED, "文のコンパイルに失敗しました: %1。"),
    (
        READ_ONLY_TRANSACTION,
        "読込専用トランザクションでデータベースを更新することはできません。",
    ),
    (
        ALREADY_BEGIN_TRANSACTION,
        "トランザクションはすでに開始されています。",
    ),
    (NOT_BEGIN_TRANSACTION, "トランザクションが開始されていません。"),
    (
        NUMERIC_VALUE_OUT_OF_RANGE,
        "数値'%1'は範囲外です。",
    ),
    (
        STRING_RIGHT_TRUNCATION,
        "文字列データの右側が切り捨てられます。",
    ),
    (NULLABILITY_VIOLATION, "列'%1'にNULL値を設定できません。"),
    (INVALID_CHARACTER, "'%1'に不正な文字があります。"),
    (DUPLICATE_KEY, "キー値が制約'%1'に違反しています。"),
    (UNEXPECTED, "予期しないエラーが発生しました。"),
    (CLASS_NOT_FOUND, "クラス(ID=%1)が存在しません。"),
    (NOT_SUPPORTED, "サポートされていない機能です。"),
    (MEMORY_EXHAUST, "サーバーのメモリが不足しています。"),
];
